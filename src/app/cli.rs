//! cli stuff
use {
    crate::{
        config::options::TagcompleteCfg,
        loader::{LoadOptions, LocalFile, SourceDescriptor},
    },
    clap::Parser,
    color_eyre::{
        Report, Section,
        eyre::{Context, Result},
    },
    schemars::generate::SchemaSettings,
    std::{
        fs::OpenOptions,
        io::{BufWriter, Write},
        path::PathBuf,
    },
    url::Url,
};

/// where `--save` writes the schema
const SCHEMA_PATH: &str = "resources/tagcomplete.schema.json";

/// where `--save` writes the default config
const DEFAULTS_PATH: &str = "resources/tagcomplete.default.toml";

/// the CLI
#[derive(Parser, Debug, Default)]
#[command(version, about = "tag autocompletion over csv and json tag datasets")]
pub struct Cli {
    /// The manifest listing the datasets to load
    #[arg(short, long)]
    pub manifest: Option<String>,

    /// The dataset loaded when the manifest lists nothing
    #[arg(long)]
    pub data_url: Option<String>,

    /// Load this source instead of the manifest (repeatable)
    #[arg(long = "source", value_name = "URL")]
    pub sources: Vec<String>,

    /// Load this local file instead of any remote source (repeatable)
    #[arg(short, long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// The URL relative source URLs are resolved against
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Print suggestions for this query and exit
    #[arg(short, long)]
    pub query: Option<String>,

    /// Save instead of printing
    #[arg(long)]
    pub save: bool,

    /// Generate a JSON schemafile based on the defaults
    #[arg(short = 's', long)]
    pub gen_schema: bool,

    /// Generate the default config file
    #[arg(short = 'd', long)]
    pub gen_default: bool,

    /// Generate both the schema and the default config file
    #[arg(short = 'a', long)]
    pub gen_all: bool,
}

impl Cli {
    /// handle the generator flags
    ///
    /// returns `true` if the program should exit afterwards
    ///
    /// # Errors
    ///
    /// returns an error if it fails to generate and/or save the json schema
    /// returns an error if it fails to generate and/or save the default config
    pub fn run_generators(&self) -> Result<bool> {
        if self.gen_schema || self.gen_all {
            Self::gen_schema(self.save)?;
        }

        if self.gen_default || self.gen_all {
            Self::gen_defaults(self.save)?;
        }

        Ok(self.gen_default || self.gen_all || self.gen_schema || self.save)
    }

    /// build load options from the config, overridden by any flags given
    ///
    /// # Errors
    ///
    /// returns an error if the base url is invalid or a file can't be read
    pub async fn load_options(&self) -> Result<LoadOptions> {
        let mut options = LoadOptions::from_config();

        if let Some(ref base) = self.base_url {
            options.base_url = Some(
                Url::parse(base)
                    .wrap_err_with(|| format!("invalid base url: {base}"))
                    .suggestion("use an absolute url like http://127.0.0.1:8080/")?,
            );
        }

        if let Some(ref manifest) = self.manifest {
            options.manifest_url = Some(manifest.clone());
        }

        if let Some(ref data_url) = self.data_url {
            options.data_url = Some(data_url.clone());
        }

        if !self.sources.is_empty() {
            options.sources = self
                .sources
                .iter()
                .map(|url| SourceDescriptor::from_url(url.as_str()))
                .collect();
        }

        options.files = read_files(&self.files).await?;
        Ok(options)
    }

    /// save a string to a file
    ///
    /// # Arguments
    ///
    /// * `path` - the path to the file being written
    /// * `contents` - the data to write to the file
    ///
    /// # Errors
    ///
    /// returns an error if it fails to open `path`
    pub fn write_to_file(path: &str, contents: &str) -> Result<()> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(path)?;
        let mut w = BufWriter::new(file);
        w.write_all(contents.as_bytes()).map_err(Report::new)
    }

    /// generate/save the config schema
    ///
    /// # Errors
    ///
    /// returns an error if it fails to convert the schema to a JSON string
    /// returns an error if it fails to save the schema
    pub fn gen_schema(save: bool) -> Result<()> {
        let settings = SchemaSettings::draft2020_12().for_serialize();
        let generator = settings.into_generator();
        let schema = generator.into_root_schema_for::<TagcompleteCfg>();
        let schema_str = serde_json::to_string_pretty(&schema)?;

        if save {
            Self::write_to_file(SCHEMA_PATH, &schema_str)?;
        } else {
            println!("{}", schema_str);
        }

        Ok(())
    }

    /// generate/save the default config file
    ///
    /// # Errors
    ///
    /// returns an error if it fails to convert the default config to TOML
    /// returns an error if it fails to save the default config
    pub fn gen_defaults(save: bool) -> Result<()> {
        let defaults = toml::to_string_pretty(&TagcompleteCfg::default())?;

        if save {
            Self::write_to_file(DEFAULTS_PATH, &defaults)?;
        } else {
            println!("{}", defaults);
        }

        Ok(())
    }
}

/// read local dataset files
///
/// # Errors
///
/// returns an error naming the first file that can't be read
pub async fn read_files(paths: &[PathBuf]) -> Result<Vec<LocalFile>> {
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        let file = LocalFile::read(path)
            .await
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        files.push(file);
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "tagcomplete",
            "--source",
            "/a.csv",
            "--source",
            "/b.json",
            "-f",
            "mine.csv",
            "--query",
            "cat",
        ]);

        assert_eq!(cli.sources, ["/a.csv", "/b.json"]);
        assert_eq!(cli.files, [PathBuf::from("mine.csv")]);
        assert_eq!(cli.query.as_deref(), Some("cat"));
        assert!(!cli.gen_schema);
    }

    #[tokio::test]
    async fn test_read_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tags.csv");
        std::fs::write(&path, "cat,0\n").expect("write");

        let files = read_files(std::slice::from_ref(&path)).await.expect("read");
        assert_eq!(files[0].name, "tags.csv");

        assert!(read_files(&[dir.path().join("missing.csv")]).await.is_err());
    }
}
