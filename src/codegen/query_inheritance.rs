use std::{error::Error, fmt::Display};

use chrono::{DateTime, TimeZone};

use crate::{
    codegen::{BaseClassNameResolver, EmittedSource, Fragment},
    config::BuildConfig,
    model::{InheritanceChild, TableDescriptor},
    utils::escape_doc_comment,
};

const TIMESTAMP_FORMAT: &str = "%c";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    ChildNotSet,
}

impl Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::ChildNotSet => write!(
                f,
                "The query stub emitter needs to be told which child class to build (via set_child) before it can build the stub class."
            ),
        }
    }
}

impl Error for BuildError {}

pub fn stub_class_name(child: &InheritanceChild) -> String {
    format!("{}Query", child.class_name)
}

/// The child's package when it has one, otherwise the table default.
pub fn resolve_package(child_package: Option<&str>, default_package: &str) -> String {
    match child_package {
        Some(package) if !package.is_empty() => package.to_owned(),
        _ => default_package.to_owned(),
    }
}

fn doc_comment<Tz: TimeZone>(
    table: &TableDescriptor,
    config: &BuildConfig,
    now: &DateTime<Tz>,
) -> String
where
    Tz::Offset: Display,
{
    let mut doc = format!(
        "\n\n/**\n * Skeleton subclass for representing a query for one of the subclasses of the '{}' table.\n *\n * {}\n *",
        escape_doc_comment(&table.name),
        escape_doc_comment(&table.description),
    );
    if config.add_time_stamp {
        doc.push_str(&format!(
            "\n * This class was autogenerated by {} {} on:\n *\n * {}\n *",
            config.generator_name,
            config.generator_version,
            now.format(TIMESTAMP_FORMAT),
        ));
    }
    doc.push_str(
        "\n * You should add additional methods to this class to meet the\n * application requirements.  This class will only be generated as\n * long as it does not already exist in the output directory.\n */",
    );
    doc
}

/// Emits the empty query class for `child`. The body is left for hand edits.
pub fn emit_stub<Tz: TimeZone>(
    table: &TableDescriptor,
    child: &InheritanceChild,
    config: &BuildConfig,
    resolver: &dyn BaseClassNameResolver,
    now: &DateTime<Tz>,
) -> EmittedSource
where
    Tz::Offset: Display,
{
    let base_class_name = resolver.base_class_name(table, child);
    let class_name = stub_class_name(child);

    let mut source = EmittedSource::default();
    if config.add_class_level_comment {
        source.push(Fragment::DocComment, doc_comment(table, config, now));
    }
    source.push(
        Fragment::Declaration,
        format!("\nclass {class_name} extends {base_class_name}\n{{\n"),
    );
    source.push(Fragment::Body, String::new());
    source.push(Fragment::Closing, format!("\n}} // {class_name}\n"));
    source
}

/// Stateful form of [`emit_stub`] for callers that set the child up front.
#[derive(Debug, Clone, Default)]
pub struct StubQueryEmitter {
    child: Option<InheritanceChild>,
}

impl StubQueryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_child(&mut self, child: InheritanceChild) {
        self.child = Some(child);
    }

    pub fn child(&self) -> Result<&InheritanceChild, BuildError> {
        self.child.as_ref().ok_or(BuildError::ChildNotSet)
    }

    pub fn class_name(&self) -> Result<String, BuildError> {
        Ok(stub_class_name(self.child()?))
    }

    pub fn resolve_package(&self, default_package: &str) -> Result<String, BuildError> {
        Ok(resolve_package(
            self.child()?.package.as_deref(),
            default_package,
        ))
    }

    pub fn emit<Tz: TimeZone>(
        &self,
        table: &TableDescriptor,
        config: &BuildConfig,
        resolver: &dyn BaseClassNameResolver,
        now: &DateTime<Tz>,
    ) -> Result<EmittedSource, BuildError>
    where
        Tz::Offset: Display,
    {
        Ok(emit_stub(table, self.child()?, config, resolver, now))
    }
}
