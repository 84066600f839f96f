use std::collections::HashMap;

/// A pre-built tree of dot-notation storage paths.
///
/// Given `["schools.classes.number", "schools.director.name", "name"]`, builds:
/// ```text
/// { "schools": Branch({ "classes": Branch({ "number": Leaf }),
///                       "director": Branch({ "name": Leaf }) }),
///   "name": Leaf }
/// ```
///
/// Built once per query and reused across every document.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldTree {
    /// The entire field.
    Leaf,
    /// Only the listed sub-fields.
    Branch(HashMap<String, FieldTree>),
}

impl FieldTree {
    pub(crate) fn from_paths<'a>(
        paths: impl IntoIterator<Item = &'a str>,
    ) -> HashMap<String, FieldTree> {
        let mut root = HashMap::new();
        for path in paths {
            insert_path(&mut root, path);
        }
        root
    }
}

fn insert_path(map: &mut HashMap<String, FieldTree>, remaining: &str) {
    match remaining.split_once('.') {
        None => {
            // A leaf takes the whole field, replacing any branch below it.
            map.insert(remaining.to_string(), FieldTree::Leaf);
        }
        Some((top, rest)) => {
            let entry = map
                .entry(top.to_string())
                .or_insert_with(|| FieldTree::Branch(HashMap::new()));
            if let FieldTree::Branch(children) = entry {
                insert_path(children, rest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_fields() {
        let tree = FieldTree::from_paths(["name", "age"]);
        assert_eq!(tree.get("name"), Some(&FieldTree::Leaf));
        assert_eq!(tree.get("age"), Some(&FieldTree::Leaf));
        assert_eq!(tree.get("missing"), None);
    }

    #[test]
    fn nested_lists_share_a_branch() {
        let tree = FieldTree::from_paths(["schools.classes.number", "schools.director.name"]);
        let Some(FieldTree::Branch(schools)) = tree.get("schools") else {
            panic!("expected branch for schools, got {tree:?}");
        };
        let Some(FieldTree::Branch(classes)) = schools.get("classes") else {
            panic!("expected branch for classes");
        };
        assert_eq!(classes.get("number"), Some(&FieldTree::Leaf));
        assert!(matches!(schools.get("director"), Some(FieldTree::Branch(_))));
    }

    #[test]
    fn leaf_overrides_branch() {
        let tree = FieldTree::from_paths(["settings.foo1", "settings"]);
        assert_eq!(tree.get("settings"), Some(&FieldTree::Leaf));
    }

    #[test]
    fn branch_does_not_override_leaf() {
        let tree = FieldTree::from_paths(["settings", "settings.foo1"]);
        assert_eq!(tree.get("settings"), Some(&FieldTree::Leaf));
    }
}
