use anyhow::{Context, Result};
use image::Rgb;
use ron::value::Value;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::templates::{MarkScatter, Size};
use crate::typeface::DEFAULT_CANDIDATES;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}
impl<T: Default> Default for ValueRange<T> {
    fn default() -> Self {
        Self {
            min: Default::default(),
            max: Default::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    /// Scalable fonts tried in order; the built-in bitmap face is used when none loads.
    pub candidates: Vec<PathBuf>,
}
impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RacingConfig {
    pub count: u32,
    pub width: u32,
    pub height: u32,
    pub base_color: (u8, u8, u8),
}
impl Default for RacingConfig {
    fn default() -> Self {
        Self {
            count: 6,
            width: 800,
            height: 600,
            base_color: (26, 26, 26),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HelmetConfig {
    pub count: u32,
    pub width: u32,
    pub height: u32,
}
impl Default for HelmetConfig {
    fn default() -> Self {
        Self {
            count: 2,
            width: 600,
            height: 600,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    pub count: u32,
    pub width: u32,
    pub height: u32,
}
impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            count: 1,
            width: 600,
            height: 800,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BackgroundConfig {
    pub count: u32,
    pub width: u32,
    pub height: u32,
    /// Accent squares scattered per image.
    pub marks: u32,
    /// Inclusive side length range of each square, in pixels.
    pub mark_side: ValueRange<u32>,
}
impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            count: 2,
            width: 1200,
            height: 800,
            marks: 20,
            mark_side: ValueRange { min: 5, max: 20 },
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogoConfig {
    /// Logos are square.
    pub side: u32,
}
impl Default for LogoConfig {
    fn default() -> Self {
        Self { side: 200 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub output_dir: PathBuf,
    pub jpeg_quality: u8,
    /// Fixed seed for the background scatter. `None` seeds from OS entropy on every run.
    pub seed: Option<u64>,
    pub fonts: FontConfig,
    pub racing: RacingConfig,
    pub helmet: HelmetConfig,
    pub driver: DriverConfig,
    pub background: BackgroundConfig,
    pub logos: LogoConfig,
}
impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("images"),
            jpeg_quality: 75,
            seed: None,
            fonts: FontConfig::default(),
            racing: RacingConfig::default(),
            helmet: HelmetConfig::default(),
            driver: DriverConfig::default(),
            background: BackgroundConfig::default(),
            logos: LogoConfig::default(),
        }
    }
}

impl RacingConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
    pub fn base(&self) -> Rgb<u8> {
        let (r, g, b) = self.base_color;
        Rgb([r, g, b])
    }
}
impl HelmetConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
impl DriverConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}
impl BackgroundConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
    pub fn scatter(&self) -> MarkScatter {
        MarkScatter {
            count: self.marks,
            min_side: self.mark_side.min,
            max_side: self.mark_side.max,
        }
    }
}

fn merge_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Map(bm), Value::Map(om)) => {
            for (k, v) in om.into_iter() {
                let existing = bm.iter_mut().find(|(ek, _)| **ek == k).map(|(_, ev)| ev);
                if let Some(ev) = existing {
                    merge_value(ev, v);
                } else {
                    bm.insert(k, v);
                }
            }
        }
        (b, o) => *b = o,
    }
}

fn merge_layer(merged: &mut Option<Value>, layer: Value) {
    if let Some(cur) = merged.as_mut() {
        merge_value(cur, layer);
    } else {
        *merged = Some(layer);
    }
}

impl PlaceholderConfig {
    /// Default layer locations, tried in order by the binary when no `--config` is given.
    pub const DEFAULT_LAYERS: [&'static str; 2] = [
        "assets/config/placeholders.ron",
        "assets/config/placeholders.local.ron",
    ];

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        ron::from_str(&data).with_context(|| format!("parse RON {}", path.display()))
    }

    /// Load multiple config layers, later files overriding earlier ones (deep merge of maps).
    /// Missing files are skipped silently; returns (config, layers_used, errors).
    /// Meant for the optional default layers; use [`Self::load_explicit`] for user-named files.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();

        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        merge_layer(&mut merged, val);
                        used.push(path_ref.display().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }

        let Some(val) = merged else {
            return (Self::default(), used, errors);
        };
        match val.into_rust::<PlaceholderConfig>() {
            Ok(cfg) => (cfg, used, errors),
            Err(e) => {
                errors.push(format!("failed to deserialize merged config; using defaults: {e}"));
                (Self::default(), used, errors)
            }
        }
    }

    /// Same merge as [`Self::load_layered`], but every layer must exist and parse.
    pub fn load_explicit<P, I>(paths: I) -> Result<Self>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        let mut merged: Option<Value> = None;
        for p in paths {
            let path_ref = p.as_ref();
            let txt = fs::read_to_string(path_ref).with_context(|| format!("read config {}", path_ref.display()))?;
            let val = ron::from_str::<Value>(&txt).with_context(|| format!("parse RON {}", path_ref.display()))?;
            merge_layer(&mut merged, val);
        }
        match merged {
            Some(val) => val.into_rust::<PlaceholderConfig>().context("deserialize merged config"),
            None => Ok(Self::default()),
        }
    }

    /// Human-readable warnings for suspicious values. None of these stop a run on their own;
    /// zero dimensions still fail later when the affected image is written.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.output_dir.as_os_str().is_empty() {
            w.push("output_dir is empty; images land in the working directory".into());
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            w.push(format!("jpeg_quality {} outside 1..=100; clamped", self.jpeg_quality));
        }
        let sized = [
            ("racing", self.racing.count, self.racing.size()),
            ("helmet", self.helmet.count, self.helmet.size()),
            ("driver", self.driver.count, self.driver.size()),
            ("background", self.background.count, self.background.size()),
        ];
        for (name, count, size) in sized {
            if count > 0 && (size.width == 0 || size.height == 0) {
                w.push(format!("{name} dimensions must be > 0 (got {}x{})", size.width, size.height));
            }
            if size.width as u64 * size.height as u64 > 50_000_000 {
                w.push(format!("very large {name} canvas: {}x{}", size.width, size.height));
            }
        }
        if self.racing.width > 0 && self.racing.width < 100 {
            w.push(format!("racing.width {} < 100; labels will overflow the canvas", self.racing.width));
        }
        let side = &self.background.mark_side;
        if side.min > side.max {
            w.push(format!("background.mark_side min {} > max {}; range swapped", side.min, side.max));
        }
        if self.background.marks == 0 {
            w.push("background.marks is 0; backgrounds carry no scatter".into());
        }
        if self.logos.side == 0 {
            w.push("logos.side must be > 0".into());
        }
        if self.fonts.candidates.is_empty() {
            w.push("fonts.candidates empty; built-in bitmap font will be used".into());
        }
        w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_fixed_plan() {
        let cfg = PlaceholderConfig::default();
        assert_eq!(cfg.racing.count, 6);
        assert_eq!(cfg.racing.size(), Size::new(800, 600));
        assert_eq!(cfg.racing.base(), Rgb([26, 26, 26]));
        assert_eq!((cfg.helmet.count, cfg.helmet.size()), (2, Size::new(600, 600)));
        assert_eq!((cfg.driver.count, cfg.driver.size()), (1, Size::new(600, 800)));
        assert_eq!((cfg.background.count, cfg.background.size()), (2, Size::new(1200, 800)));
        assert_eq!(cfg.background.scatter(), MarkScatter::default());
        assert_eq!(cfg.logos.side, 200);
        assert_eq!(cfg.output_dir, PathBuf::from("images"));
        assert!(cfg.seed.is_none());
        assert!(cfg.validate().is_empty(), "defaults warn: {:?}", cfg.validate());
    }

    #[test]
    fn parse_sample_config() {
        let sample = r#"(
            output_dir: "out/art",
            jpeg_quality: 90,
            seed: Some(1234),
            fonts: (candidates: ["fonts/Inter.ttf"]),
            racing: (count: 3, base_color: (10, 20, 30)),
            background: (marks: 5, mark_side: (min: 2, max: 4)),
        )"#;
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        file.write_all(sample.as_bytes()).unwrap();
        let cfg = PlaceholderConfig::load_from_file(file.path()).expect("parse config");
        assert_eq!(cfg.output_dir, PathBuf::from("out/art"));
        assert_eq!(cfg.jpeg_quality, 90);
        assert_eq!(cfg.seed, Some(1234));
        assert_eq!(cfg.fonts.candidates, vec![PathBuf::from("fonts/Inter.ttf")]);
        assert_eq!(cfg.racing.count, 3);
        assert_eq!(cfg.racing.width, 800); // default retained
        assert_eq!(cfg.racing.base(), Rgb([10, 20, 30]));
        assert_eq!(cfg.background.scatter(), MarkScatter { count: 5, min_side: 2, max_side: 4 });
        assert_eq!(cfg.helmet, HelmetConfig::default());
    }

    #[test]
    fn layered_merge_overrides() {
        let base = r"(
            jpeg_quality: 80,
            helmet: (count: 4, width: 300),
        )";
        let override_one = r#"(
            output_dir: "custom",
            helmet: (width: 320),
        )"#;
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        let mut f2 = tempfile::NamedTempFile::new().unwrap();
        f1.write_all(base.as_bytes()).unwrap();
        f2.write_all(override_one.as_bytes()).unwrap();
        let missing = f1.path().with_extension("absent.ron");
        let (cfg, used, errors) = PlaceholderConfig::load_layered([f1.path(), missing.as_path(), f2.path()]);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(used.len(), 2);
        assert_eq!(cfg.jpeg_quality, 80); // from base
        assert_eq!(cfg.helmet.count, 4); // from base, deep-merged
        assert_eq!(cfg.helmet.width, 320); // overridden
        assert_eq!(cfg.helmet.height, HelmetConfig::default().height);
        assert_eq!(cfg.output_dir, PathBuf::from("custom"));
    }

    #[test]
    fn layered_reports_parse_errors_and_keeps_defaults() {
        let mut bad = tempfile::NamedTempFile::new().unwrap();
        bad.write_all(b"(helmet: (count: ").unwrap();
        let (cfg, used, errors) = PlaceholderConfig::load_layered([bad.path()]);
        assert!(used.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(cfg, PlaceholderConfig::default());
    }

    #[test]
    fn layered_merge_adds_keys_missing_from_base() {
        let base = r"(helmet: (count: 4))";
        let overlay = r"(
            driver: (count: 3),
            helmet: (height: 500),
            background: (mark_side: (max: 9)),
        )";
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        let mut f2 = tempfile::NamedTempFile::new().unwrap();
        f1.write_all(base.as_bytes()).unwrap();
        f2.write_all(overlay.as_bytes()).unwrap();
        let (cfg, used, errors) = PlaceholderConfig::load_layered([f1.path(), f2.path()]);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(used.len(), 2);
        assert_eq!(cfg.helmet.count, 4);
        assert_eq!(cfg.helmet.height, 500); // nested key absent from base
        assert_eq!(cfg.driver.count, 3); // top-level key absent from base
        assert_eq!(cfg.background.mark_side, ValueRange { min: 0, max: 9 }); // ValueRange default fills min
    }

    #[test]
    fn explicit_layers_merge_like_layered() {
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        let mut f2 = tempfile::NamedTempFile::new().unwrap();
        f1.write_all(br"(jpeg_quality: 60, helmet: (count: 5))").unwrap();
        f2.write_all(br"(helmet: (width: 128))").unwrap();
        let cfg = PlaceholderConfig::load_explicit([f1.path(), f2.path()]).expect("explicit layers load");
        assert_eq!(cfg.jpeg_quality, 60);
        assert_eq!((cfg.helmet.count, cfg.helmet.width), (5, 128));
        let none: [&str; 0] = [];
        assert_eq!(PlaceholderConfig::load_explicit(none).unwrap(), PlaceholderConfig::default());
    }

    #[test]
    fn explicit_missing_layer_is_an_error() {
        let good = tempfile::NamedTempFile::new().unwrap();
        let missing = good.path().with_extension("typo.ron");
        let err = PlaceholderConfig::load_explicit([missing.as_path()]).unwrap_err();
        assert!(format!("{err:#}").contains("read config"), "{err:#}");
    }

    #[test]
    fn explicit_unparsable_layer_is_an_error() {
        let mut bad = tempfile::NamedTempFile::new().unwrap();
        bad.write_all(b"(output_dir: \"out\", helmet: (count: ").unwrap();
        let err = PlaceholderConfig::load_explicit([bad.path()]).unwrap_err();
        assert!(format!("{err:#}").contains("parse RON"), "{err:#}");

        let mut wrong_type = tempfile::NamedTempFile::new().unwrap();
        wrong_type.write_all(br#"(helmet: (count: "many"))"#).unwrap();
        assert!(PlaceholderConfig::load_explicit([wrong_type.path()]).is_err());
    }

    #[test]
    fn validate_detects_warnings() {
        let mut bad = PlaceholderConfig::default();
        bad.jpeg_quality = 0;
        bad.helmet.width = 0;
        bad.racing.width = 50;
        bad.background.mark_side = ValueRange { min: 30, max: 10 };
        bad.logos.side = 0;
        bad.fonts.candidates.clear();
        let warnings = bad.validate();
        for needle in ["jpeg_quality", "helmet dimensions", "racing.width", "mark_side", "logos.side", "fonts.candidates"] {
            assert!(warnings.iter().any(|w| w.contains(needle)), "missing warning for {needle}: {warnings:?}");
        }
    }
}
