pub mod query_inheritance;

use std::fmt::{self, Display};

use crate::model::{InheritanceChild, TableDescriptor};

/// Computes the name of the generated base query class a stub extends.
pub trait BaseClassNameResolver {
    fn base_class_name(&self, table: &TableDescriptor, child: &InheritanceChild) -> String;
}

impl<F> BaseClassNameResolver for F
where
    F: Fn(&TableDescriptor, &InheritanceChild) -> String,
{
    fn base_class_name(&self, table: &TableDescriptor, child: &InheritanceChild) -> String {
        self(table, child)
    }
}

fn trim_namespace(namespace: &str) -> Option<&str> {
    Some(namespace.trim_matches('\\')).filter(|ns| !ns.is_empty())
}

/// `Base<Child>Query`, or `\<Namespace>\Base\<Child>Query` for namespaced tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseQueryResolver;

impl BaseClassNameResolver for BaseQueryResolver {
    fn base_class_name(&self, table: &TableDescriptor, child: &InheritanceChild) -> String {
        match table.namespace.as_deref().and_then(trim_namespace) {
            Some(namespace) => format!("\\{namespace}\\Base\\{}Query", child.class_name),
            None => format!("Base{}Query", child.class_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fragment {
    DocComment,
    Declaration,
    Body,
    Closing,
}

/// Source text of one generated class, kept as its ordered fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmittedSource {
    fragments: Vec<(Fragment, String)>,
}

impl EmittedSource {
    // Fragments must arrive in declaration order.
    pub(crate) fn push(&mut self, fragment: Fragment, text: String) {
        debug_assert!(
            self.fragments
                .last()
                .is_none_or(|(last, _)| *last < fragment),
            "{fragment:?} appended out of order"
        );
        self.fragments.push((fragment, text));
    }

    #[cfg(test)]
    pub fn fragments(&self) -> impl Iterator<Item = (Fragment, &str)> {
        self.fragments
            .iter()
            .map(|(fragment, text)| (*fragment, text.as_str()))
    }

    #[cfg(test)]
    pub fn fragment(&self, kind: Fragment) -> Option<&str> {
        self.fragments()
            .find_map(|(fragment, text)| (fragment == kind).then_some(text))
    }
}

impl Display for EmittedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, text) in &self.fragments {
            f.write_str(text)?;
        }
        Ok(())
    }
}

/// Wraps emitted class text into a complete PHP file.
pub fn render_php_file(namespace: Option<&str>, source: &EmittedSource) -> String {
    let mut code = String::from("<?php\n");
    if let Some(namespace) = namespace.and_then(trim_namespace) {
        code.push_str(&format!("\nnamespace {namespace};\n"));
    }
    code.push_str(&source.to_string());
    code
}
