use std::collections::HashMap;
#[cfg(feature = "native")]
use std::fs;
#[cfg(feature = "native")]
use std::path::{
  Path,
  PathBuf
};

use anyhow::anyhow;
#[cfg(feature = "native")]
use anyhow::Context;
use tracing::debug;
#[cfg(feature = "native")]
use tracing::{
  info,
  trace,
  warn
};

use crate::datastore::DEFAULT_TASKS_KEY;
use crate::theme::Theme;

/// Categories offered by the popup
/// selectors. Stored categories are
/// free-form; these are only choices.
pub const DEFAULT_CATEGORIES: [&str; 5] = [
  "work", "personal", "errand",
  "finance", "health"
];

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  // Canonical paths already read, so an
  // include cycle stops instead of
  // recursing.
  #[cfg(feature = "native")]
  loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let mut map = HashMap::new();
    map.insert(
      "data.location".to_string(),
      "~/.taskpop/tasks.json"
        .to_string()
    );
    map.insert(
      "storage.key".to_string(),
      DEFAULT_TASKS_KEY.to_string()
    );
    map.insert(
      "theme.default".to_string(),
      "light".to_string()
    );
    map.insert(
      "color".to_string(),
      "on".to_string()
    );

    Self {
      map,
      #[cfg(feature = "native")]
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[cfg(feature = "native")]
  #[tracing::instrument(skip(
    rc_override
  ))]
  pub fn load(
    rc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::default();

    let rc = resolve_rc_path(
      rc_override
    )?;
    if let Some(path) = rc {
      info!(rc = %path.display(), "loading taskpoprc");
      cfg.load_file(&path)?;
    } else {
      debug!(
        "no taskpoprc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  /// `None` when the key is unset,
  /// an error when the value is not a
  /// recognised boolean.
  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    self
      .map
      .get(key)
      .map(|v| {
        parse_bool(v).ok_or_else(|| {
          anyhow!(
            "invalid {key} setting: {v}"
          )
        })
      })
      .transpose()
  }

  pub fn storage_key(&self) -> String {
    self
      .get("storage.key")
      .filter(|key| !key.trim().is_empty())
      .unwrap_or_else(|| {
        DEFAULT_TASKS_KEY.to_string()
      })
  }

  pub fn default_theme(
    &self
  ) -> anyhow::Result<Theme> {
    let raw = self
      .get("theme.default")
      .unwrap_or_else(|| {
        "light".to_string()
      });
    Theme::from_config_value(&raw)
      .ok_or_else(|| {
        anyhow!(
          "invalid theme.default \
           setting: {raw}"
        )
      })
  }

  #[cfg(feature = "native")]
  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let canonical =
      fs::canonicalize(&path)
        .unwrap_or_else(|_| path.clone());
    if self
      .loaded_files
      .contains(&canonical)
    {
      warn!(file = %path.display(), "config file already loaded; skipping include cycle");
      return Ok(());
    }

    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self.loaded_files.push(canonical);

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let Some(line) =
        strip_comment(raw_line)
      else {
        continue;
      };

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          self
            .load_file(&include_path)?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, value = %value, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

/// Resolves the JSON file backing the
/// CLI's key-value area.
#[cfg(feature = "native")]
#[tracing::instrument(skip(
  cfg,
  override_path
))]
pub fn resolve_data_file(
  cfg: &Config,
  override_path: Option<&Path>
) -> anyhow::Result<PathBuf> {
  if let Some(path) = override_path {
    return Ok(expand_tilde(path));
  }

  if let Some(cfg_value) =
    cfg.get("data.location")
  {
    return Ok(expand_tilde(
      Path::new(&cfg_value)
    ));
  }

  let home = dirs::home_dir()
    .ok_or_else(|| {
      anyhow!(
        "cannot determine home \
         directory"
      )
    })?;
  Ok(
    home
      .join(".taskpop")
      .join("tasks.json")
  )
}

#[cfg(feature = "native")]
#[tracing::instrument(skip(
  override_path
))]
fn resolve_rc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(rc_env) =
    std::env::var("TASKPOPRC")
  {
    if rc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      rc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    return Ok(None);
  };
  let candidate =
    home.join(".taskpoprc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

#[cfg(feature = "native")]
fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

#[cfg(feature = "native")]
fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

#[cfg(feature = "native")]
fn strip_comment(
  raw_line: &str
) -> Option<&str> {
  let mut line = raw_line.trim();
  if let Some((before, _)) =
    line.split_once('#')
  {
    line = before.trim();
  }

  if line.is_empty() {
    None
  } else {
    Some(line)
  }
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Some(true),
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}

#[cfg(all(test, feature = "native"))]
mod tests {
  use std::fs;

  use super::*;

  fn write_rc(
    dir: &Path,
    name: &str,
    body: &str
  ) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body)
      .expect("write rc");
    path
  }

  #[test]
  fn rc_file_overrides_defaults() {
    let temp = tempfile::tempdir()
      .expect("tempdir");
    let rc = write_rc(
      temp.path(),
      "taskpoprc",
      "# popup settings\n\
       storage.key = todo-items\n\
       theme.default = dark # night\n\
       color = off\n"
    );

    let cfg = Config::load(Some(&rc))
      .expect("load rc");
    assert_eq!(
      cfg.storage_key(),
      "todo-items"
    );
    assert_eq!(
      cfg.default_theme().expect("theme"),
      Theme::Dark
    );
    assert_eq!(
      cfg.get_bool("color").expect("bool"),
      Some(false)
    );
    assert_eq!(
      cfg.get("data.location").as_deref(),
      Some("~/.taskpop/tasks.json")
    );
  }

  #[test]
  fn malformed_line_names_file_and_line()
  {
    let temp = tempfile::tempdir()
      .expect("tempdir");
    let rc = write_rc(
      temp.path(),
      "taskpoprc",
      "color = on\nnot a setting\n"
    );

    let err = Config::load(Some(&rc))
      .expect_err("bad line");
    let message = format!("{err:#}");
    assert!(message.contains("taskpoprc:2"));
    assert!(message.contains("not a setting"));
  }

  #[test]
  fn include_cycle_loads_each_file_once()
  {
    let temp = tempfile::tempdir()
      .expect("tempdir");
    write_rc(
      temp.path(),
      "b.rc",
      "include a.rc\ntheme.default = dark\n"
    );
    let a = write_rc(
      temp.path(),
      "a.rc",
      "include b.rc\nstorage.key = cycled\n"
    );

    let cfg = Config::load(Some(&a))
      .expect("cycle is not an error");
    assert_eq!(cfg.storage_key(), "cycled");
    assert_eq!(
      cfg.default_theme().expect("theme"),
      Theme::Dark
    );
    assert_eq!(cfg.loaded_files.len(), 2);
  }

  #[test]
  fn missing_include_is_skipped() {
    let temp = tempfile::tempdir()
      .expect("tempdir");
    let rc = write_rc(
      temp.path(),
      "taskpoprc",
      "include nowhere.rc\ncolor = yes\n"
    );

    let cfg = Config::load(Some(&rc))
      .expect("load rc");
    assert_eq!(
      cfg.get_bool("color").expect("bool"),
      Some(true)
    );
  }

  #[test]
  fn overrides_strip_rc_prefix_and_win() {
    let mut cfg = Config::default();
    cfg.apply_overrides([
      (
        "rc.storage.key".to_string(),
        "alt".to_string()
      ),
      (
        "color".to_string(),
        "maybe".to_string()
      )
    ]);

    assert_eq!(cfg.storage_key(), "alt");
    assert!(cfg.get_bool("color").is_err());
    assert_eq!(
      cfg.get_bool("absent").expect("unset"),
      None
    );
  }

  #[test]
  fn blank_storage_key_falls_back() {
    let mut cfg = Config::default();
    cfg.apply_overrides([(
      "storage.key".to_string(),
      "  ".to_string()
    )]);
    assert_eq!(
      cfg.storage_key(),
      DEFAULT_TASKS_KEY
    );
  }

  #[test]
  fn invalid_theme_is_an_error() {
    let mut cfg = Config::default();
    cfg.apply_overrides([(
      "theme.default".to_string(),
      "sepia".to_string()
    )]);
    assert!(cfg.default_theme().is_err());
  }
}
