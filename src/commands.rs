use std::{
    collections::HashSet,
    error::Error,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use crate::{
    codegen::{BaseQueryResolver, query_inheritance::StubQueryEmitter, render_php_file},
    config::{BuildConfig, CONFIG_FILE, ModelSource, QueryStubConfig, TomlConfig, get_config},
    model::Model,
    utils::package_path,
};

fn init_standard() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn init_debug() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[derive(clap::Args)]
#[command(about, long_about = None, name = "init")]
pub struct Initialize {}

impl Initialize {
    pub fn init(self) -> Result<(), Box<dyn Error>> {
        match write_starter_config(Path::new(CONFIG_FILE))? {
            true => eprintln!("Written config to {CONFIG_FILE}!"),
            false => eprintln!("{CONFIG_FILE} already exists.\nExiting..."),
        }
        Ok(())
    }
}

/// Returns `false` without touching the file when it already exists.
fn write_starter_config(path: &Path) -> Result<bool, Box<dyn Error>> {
    if std::fs::exists(path)? {
        return Ok(false);
    }
    let options = TomlConfig {
        path: ModelSource::Single("<path/to/model.toml>".into()),
        target: "<path/to/output/directory>".into(),
        build: BuildConfig::default().into(),
    };
    let toml = toml::to_string_pretty(&options)?;
    Ok(write_if_absent(path, &toml)?)
}

#[derive(clap::Args)]
#[command(about, long_about = None)]
pub struct Generate {
    config: Option<PathBuf>,
    #[arg(long, help = "Show debug information")]
    debug: bool,
    #[arg(long, help = "Print the stubs as JSON instead of writing them")]
    dry_run: bool,
}

impl Generate {
    pub fn generate(self) -> Result<(), Box<dyn Error>> {
        match self.debug {
            true => init_debug()?,
            false => init_standard()?,
        }
        let config = get_config(self.config)?;
        let stubs = collect_stubs(&config, &Local::now())?;

        if self.dry_run {
            println!("{}", print_stubs(&stubs)?);
            return Ok(());
        }
        let written = write_stubs(&stubs)?;
        info!("{written} of {} stubs written.", stubs.len());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StubFile {
    pub table: String,
    pub class_name: String,
    pub package: String,
    pub path: PathBuf,
    pub code: String,
}

pub fn collect_stubs(
    config: &QueryStubConfig,
    now: &DateTime<Local>,
) -> Result<Vec<StubFile>, Box<dyn Error>> {
    let mut stubs = vec![];
    let mut paths = HashSet::<PathBuf>::new();

    for source in &config.source {
        let model = Model::load(source)?;
        for (table, child) in model.stubs() {
            let mut emitter = StubQueryEmitter::new();
            emitter.set_child(child.clone());
            let class_name = emitter.class_name()?;
            let package = emitter.resolve_package(&table.package)?;
            let path = config
                .target
                .join(package_path(&package))
                .join(format!("{class_name}.php"));
            if paths.contains(&path) {
                error!("{} is generated twice. Skipping...", path.display());
                continue;
            }
            let emitted = emitter.emit(table, &config.build, &BaseQueryResolver, now)?;
            let code = render_php_file(table.namespace.as_deref(), &emitted);
            paths.insert(path.clone());
            stubs.push(StubFile {
                table: table.name.clone(),
                class_name,
                package,
                path,
                code,
            });
        }
    }
    Ok(stubs)
}

pub fn print_stubs(stubs: &[StubFile]) -> Result<String, Box<dyn Error>> {
    Ok(serde_json::to_string_pretty(stubs)?)
}

/// Stubs are hand-edited after generation, so existing files are never replaced.
fn write_if_absent(path: &Path, code: &str) -> io::Result<bool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().write(true).create_new(true).open(path);
    let mut file = match file {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(err),
    };
    file.write_all(code.as_bytes())?;
    Ok(true)
}

pub fn write_stubs(stubs: &[StubFile]) -> Result<usize, Box<dyn Error>> {
    let mut written = 0;
    for stub in stubs {
        if write_if_absent(&stub.path, &stub.code)? {
            info!("Written {}", stub.path.display());
            written += 1;
        } else {
            info!("{} already exists. Skipping...", stub.path.display());
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    const MANIFEST: &str = r#"
[[table]]
name = "book"
description = "Books table"
package = "bookstore"
namespace = "Bookstore"

[[table.child]]
class-name = "Ebook"
package = "bookstore.ebook"

[[table.child]]
class-name = "Paperback"

[[table.child]]
class-name = "Paperback"
"#;

    fn setup(dir: &Path) -> QueryStubConfig {
        let manifest = dir.join("model.toml");
        std::fs::write(&manifest, MANIFEST).unwrap();
        QueryStubConfig {
            source: vec![manifest],
            target: dir.join("generated"),
            build: BuildConfig {
                add_time_stamp: true,
                ..BuildConfig::default()
            },
        }
    }

    fn now() -> DateTime<Local> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0)
            .unwrap()
            .with_timezone(&Local)
    }

    #[test]
    fn collects_one_stub_per_child() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        let stubs = collect_stubs(&config, &now()).unwrap();

        assert_eq!(stubs.len(), 2);
        assert_eq!(
            stubs[0].path,
            config.target.join("bookstore/ebook/EbookQuery.php")
        );
        assert_eq!(stubs[0].package, "bookstore.ebook");
        assert_eq!(
            stubs[1].path,
            config.target.join("bookstore/PaperbackQuery.php")
        );
        assert!(stubs[0].code.starts_with("<?php\n\nnamespace Bookstore;\n"));
        assert!(
            stubs[0]
                .code
                .contains("class EbookQuery extends \\Bookstore\\Base\\EbookQuery\n{\n")
        );
        assert!(stubs[1].code.ends_with("} // PaperbackQuery\n"));
    }

    #[test]
    fn existing_stubs_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        let stubs = collect_stubs(&config, &now()).unwrap();

        assert_eq!(write_stubs(&stubs).unwrap(), 2);
        let edited = "<?php\n// hand edited\n";
        std::fs::write(&stubs[0].path, edited).unwrap();

        assert_eq!(write_stubs(&stubs).unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&stubs[0].path).unwrap(), edited);
        assert_eq!(
            std::fs::read_to_string(&stubs[1].path).unwrap(),
            stubs[1].code
        );
    }

    #[test]
    fn missing_manifest_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = QueryStubConfig {
            source: vec![dir.path().join("absent.toml")],
            target: dir.path().to_path_buf(),
            build: BuildConfig::default(),
        };
        let error = collect_stubs(&config, &now()).unwrap_err();
        assert!(error.to_string().contains("absent.toml"));
    }

    #[test]
    fn dry_run_lists_stubs_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        let stubs = collect_stubs(&config, &now()).unwrap();

        let listing = print_stubs(&stubs).unwrap();
        let listing: serde_json::Value = serde_json::from_str(&listing).unwrap();
        let entries = listing.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["class-name"], "EbookQuery");
        assert_eq!(entries[1]["package"], "bookstore");
        assert!(
            entries[0]["code"]
                .as_str()
                .unwrap()
                .contains("} // EbookQuery")
        );
        assert!(!config.target.exists());
    }

    #[test]
    fn init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        assert!(write_starter_config(&path).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        let config: TomlConfig = toml::from_str(&written).unwrap();
        assert!(QueryStubConfig::from_toml_config(config).is_ok());

        let edited = "path = \"model.toml\"\ntarget = \"out\"\n";
        std::fs::write(&path, edited).unwrap();
        assert!(!write_starter_config(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), edited);
    }
}
