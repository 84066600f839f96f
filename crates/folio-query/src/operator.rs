use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Exists,
    IContains,
    IStartsWith,
    IEndsWith,
}

impl Operator {
    /// Operator named by a keyword suffix: `age__gte` → `Gte`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "ne" => Self::Ne,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "in" => Self::In,
            "nin" => Self::Nin,
            "exists" => Self::Exists,
            "icontains" => Self::IContains,
            "istartswith" => Self::IStartsWith,
            "iendswith" => Self::IEndsWith,
            _ => return None,
        })
    }

    /// Driver operator key for operators that map one-to-one.
    pub(crate) fn driver_key(&self) -> Option<&'static str> {
        Some(match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Exists => "$exists",
            Self::IContains | Self::IStartsWith | Self::IEndsWith => return None,
        })
    }

    pub fn takes_list(&self) -> bool {
        matches!(self, Self::In | Self::Nin)
    }

    pub fn is_text_match(&self) -> bool {
        matches!(self, Self::IContains | Self::IStartsWith | Self::IEndsWith)
    }
}
