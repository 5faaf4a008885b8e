//! The analysis: a config-driven collection of ingested time series.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use plumber_model::{Config, ConfigError, ConfigValue, TimeSeries, VariableSelection};

use crate::error::{AnalysisError, Result};
use crate::manifest::Manifest;

/// Suffix appended to a category name to form its `[filetemplates]` key.
const TEMPLATE_SUFFIX: &str = "_file_template";

/// A benchmark run in memory: the configuration it was built from, the
/// ingested tables keyed site then source, and a manifest of every pair.
/// The manifest is a superset of the tables; after a structural-only
/// restore it names pairs whose tables are not loaded yet.
#[derive(Debug)]
pub struct Analysis {
    pub(crate) config: Config,
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) data: BTreeMap<String, BTreeMap<String, TimeSeries>>,
    pub(crate) manifest: Manifest,
    pub(crate) restored_version: Option<u32>,
}

impl Analysis {
    /// Parse the configuration at `path`, or start from an empty one.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::parse(path)?,
            None => Config::empty(),
        };
        Ok(Self::with_config(config, config_path.map(Path::to_path_buf)))
    }

    /// Wrap an already-parsed configuration.
    pub fn with_config(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
            data: BTreeMap::new(),
            manifest: Manifest::new(),
            restored_version: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Schema version of the stored state this analysis was restored from,
    /// if it was restored at all.
    pub fn restored_schema_version(&self) -> Option<u32> {
        self.restored_version
    }

    /// Sites with at least one loaded table.
    pub fn sites(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn series(&self, site: &str, source: &str) -> Option<&TimeSeries> {
        self.data.get(site)?.get(source)
    }

    pub fn site_series(&self, site: &str) -> Option<&BTreeMap<String, TimeSeries>> {
        self.data.get(site)
    }

    /// Number of (site, source) tables currently in memory. After a
    /// structural-only restore this is zero even though the manifest is not.
    pub fn loaded_pair_count(&self) -> usize {
        self.data.values().map(BTreeMap::len).sum()
    }

    /// Ingest one file as the (site, source) pair.
    ///
    /// Re-ingesting a pair replaces its table and leaves a single manifest
    /// entry.
    pub fn ingest_one(
        &mut self,
        site: &str,
        source: &str,
        path: &Path,
        selection: &VariableSelection,
        tshift_minutes: Option<i64>,
    ) -> Result<()> {
        let series = plumber_ingest::ingest(path, selection, tshift_minutes).map_err(|e| {
            AnalysisError::Ingest {
                site: site.to_string(),
                source_name: source.to_string(),
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        debug!(
            site,
            source,
            rows = series.height(),
            "ingested {}",
            path.display()
        );
        self.data
            .entry(site.to_string())
            .or_default()
            .insert(source.to_string(), series);
        self.manifest.record(site, source);
        Ok(())
    }

    /// Walk the configuration contract and ingest everything it names.
    ///
    /// Every source listed under `[sources]` and every observation category
    /// under `[observations]` is crossed with every site in `[sites]`.
    /// Paths come from `[filetemplates]` entries keyed
    /// `<category>_file_template`, with `{site}` and `{model}` placeholders;
    /// per-source time shifts come from `[tshifts]`, keyed by lowercased
    /// source name. With nothing to ingest this is a no-op and `[sites]` is
    /// not consulted. The walk is sequential and stops at the first
    /// failure, keeping the pairs already ingested.
    pub fn ingest_all(&mut self, selection: &VariableSelection) -> Result<()> {
        let model_groups: Vec<(String, Vec<String>)> = self
            .config
            .section("sources")
            .map(|keys| {
                keys.iter()
                    .map(|(category, value)| (category.clone(), value.as_str_list()))
                    .collect()
            })
            .unwrap_or_default();
        let observations: Vec<String> = self
            .config
            .get("observations", "observations")
            .map(ConfigValue::as_str_list)
            .unwrap_or_default();
        if model_groups.iter().all(|(_, sources)| sources.is_empty()) && observations.is_empty() {
            return Ok(());
        }
        let sites = self.config.str_list("sites", "sites")?;

        for (category, sources) in &model_groups {
            if sources.is_empty() {
                continue;
            }
            let template = self.template_for(category)?;
            for source in sources {
                let tshift = self.tshift_for(source)?;
                for site in &sites {
                    let path = fill_template(&template, site, source);
                    self.ingest_one(site, source, &path, selection, tshift)?;
                }
            }
        }
        for category in &observations {
            let template = self.template_for(category)?;
            let tshift = self.tshift_for(category)?;
            for site in &sites {
                let path = fill_template(&template, site, category);
                self.ingest_one(site, category, &path, selection, tshift)?;
            }
        }
        Ok(())
    }

    fn template_for(&self, category: &str) -> Result<String> {
        let key = format!("{category}{TEMPLATE_SUFFIX}");
        match self
            .config
            .get("filetemplates", &key)
            .and_then(ConfigValue::as_str)
        {
            Some(template) => Ok(template.to_string()),
            None => Err(AnalysisError::MissingTemplate {
                category: category.to_string(),
            }),
        }
    }

    fn tshift_for(&self, source: &str) -> Result<Option<i64>> {
        let key = source.to_lowercase();
        match self.config.get("tshifts", &key) {
            None => Ok(None),
            Some(value) => match value.as_i64() {
                Some(minutes) => Ok(Some(minutes)),
                None => Err(ConfigError::WrongShape {
                    section: "tshifts".to_string(),
                    key,
                    expected: "an integer number of minutes",
                }
                .into()),
            },
        }
    }
}

fn fill_template(template: &str, site: &str, model: &str) -> PathBuf {
    PathBuf::from(template.replace("{site}", site).replace("{model}", model))
}
