use crate::executor::DocIter;

pub(crate) fn execute<'a>(skip: usize, take: Option<usize>, source: DocIter<'a>) -> DocIter<'a> {
    let iter = source.skip(skip);
    match take {
        Some(n) => Box::new(iter.take(n)),
        None => Box::new(iter),
    }
}
