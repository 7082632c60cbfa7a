use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf},
};

const COMMENT_TERMINATOR: &str = "*/";

/// `bookstore.ebook` -> `bookstore/ebook`. Only plain names survive, so the
/// result always stays relative.
pub fn package_path(package: &str) -> PathBuf {
    package
        .split('.')
        .flat_map(|segment| Path::new(segment).components())
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect()
}

// Text placed inside a `/** */` block must not close it early.
pub fn escape_doc_comment(text: &str) -> Cow<'_, str> {
    match text.contains(COMMENT_TERMINATOR) {
        true => Cow::Owned(text.replace(COMMENT_TERMINATOR, "*\\/")),
        false => Cow::Borrowed(text),
    }
}
