//! Generation plan and its sequential runner.
//!
//! The plan is a fixed list of jobs derived from configuration. Jobs run one after another;
//! the first failure stops the run and leaves earlier files in place. Logos are guarded: they
//! are written only when the target is missing or empty.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use image::Rgb;
use rand::Rng;
use tracing::{debug, info};

use crate::config::PlaceholderConfig;
use crate::templates::{self, MarkScatter, Size};
use crate::typeface::Typeface;

pub const MARK_LOGO_FILE: &str = "m-logo.png";
pub const WORDMARK_FILE: &str = "mrad-wordmark.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoKind {
    Mark,
    Wordmark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    Labeled { label: String, base: Rgb<u8> },
    Helmet,
    Driver,
    Background { scatter: MarkScatter },
    Logo(LogoKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetJob {
    pub kind: AssetKind,
    pub file_name: String,
    pub size: Size,
}

impl AssetJob {
    /// Guarded jobs keep an existing non-empty file.
    pub fn is_guarded(&self) -> bool {
        matches!(self.kind, AssetKind::Logo(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPlan {
    pub jobs: Vec<AssetJob>,
}

impl GenerationPlan {
    /// racing{n}.jpg, helmet{n}.jpg, driver{n}.jpg, background{n}.jpg, then the two logos.
    pub fn from_config(cfg: &PlaceholderConfig) -> Self {
        let mut jobs = Vec::new();
        for n in 1..=cfg.racing.count {
            jobs.push(AssetJob {
                kind: AssetKind::Labeled { label: format!("Racing Photo {n}"), base: cfg.racing.base() },
                file_name: format!("racing{n}.jpg"),
                size: cfg.racing.size(),
            });
        }
        for n in 1..=cfg.helmet.count {
            jobs.push(AssetJob { kind: AssetKind::Helmet, file_name: format!("helmet{n}.jpg"), size: cfg.helmet.size() });
        }
        for n in 1..=cfg.driver.count {
            jobs.push(AssetJob { kind: AssetKind::Driver, file_name: format!("driver{n}.jpg"), size: cfg.driver.size() });
        }
        for n in 1..=cfg.background.count {
            jobs.push(AssetJob {
                kind: AssetKind::Background { scatter: cfg.background.scatter() },
                file_name: format!("background{n}.jpg"),
                size: cfg.background.size(),
            });
        }
        let side = cfg.logos.side;
        for (kind, file) in [(LogoKind::Mark, MARK_LOGO_FILE), (LogoKind::Wordmark, WORDMARK_FILE)] {
            jobs.push(AssetJob { kind: AssetKind::Logo(kind), file_name: file.to_string(), size: Size::new(side, side) });
        }
        Self { jobs }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create output directory {}", dir.display()))
}

/// True when `path` is missing or zero-length. Other metadata failures propagate.
pub fn needs_generation(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len() == 0),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e).with_context(|| format!("inspect {}", path.display())),
    }
}

/// Execute every job in order inside `dir`, which must already exist.
pub fn run_plan<R: Rng + ?Sized>(
    plan: &GenerationPlan,
    dir: &Path,
    face: &Typeface,
    rng: &mut R,
    jpeg_quality: u8,
) -> Result<RunReport> {
    let mut report = RunReport::default();
    for job in &plan.jobs {
        let path = dir.join(&job.file_name);
        if job.is_guarded() && !needs_generation(&path)? {
            debug!("keeping existing {}", path.display());
            report.skipped.push(path);
            continue;
        }
        match &job.kind {
            AssetKind::Labeled { label, base } => templates::create_labeled_image(&path, label, job.size, *base, face, jpeg_quality)?,
            AssetKind::Helmet => templates::create_helmet_image(&path, job.size, jpeg_quality)?,
            AssetKind::Driver => templates::create_driver_image(&path, job.size, face, jpeg_quality)?,
            AssetKind::Background { scatter } => templates::create_background_image(&path, job.size, rng, *scatter, jpeg_quality)?,
            AssetKind::Logo(LogoKind::Mark) => templates::create_mark_logo(&path, job.size.width)?,
            AssetKind::Logo(LogoKind::Wordmark) => templates::create_wordmark_logo(&path, job.size.width, face)?,
        }
        report.written.push(path);
    }
    Ok(report)
}

/// Create the output directory and run the plan derived from `cfg`.
pub fn run<R: Rng + ?Sized>(cfg: &PlaceholderConfig, face: &Typeface, rng: &mut R) -> Result<RunReport> {
    ensure_output_dir(&cfg.output_dir)?;
    let plan = GenerationPlan::from_config(cfg);
    let report = run_plan(&plan, &cfg.output_dir, face, rng, cfg.jpeg_quality)?;
    info!(
        "{} written, {} kept in {}",
        report.written.len(),
        report.skipped.len(),
        cfg.output_dir.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_shape() {
        let plan = GenerationPlan::from_config(&PlaceholderConfig::default());
        assert_eq!(plan.len(), 13);
        let names: Vec<&str> = plan.jobs.iter().map(|j| j.file_name.as_str()).collect();
        assert_eq!(
            names,
            [
                "racing1.jpg", "racing2.jpg", "racing3.jpg", "racing4.jpg", "racing5.jpg", "racing6.jpg",
                "helmet1.jpg", "helmet2.jpg", "driver1.jpg", "background1.jpg", "background2.jpg",
                "m-logo.png", "mrad-wordmark.png",
            ]
        );
        assert_eq!(plan.jobs.iter().filter(|j| j.is_guarded()).count(), 2);
        match &plan.jobs[3].kind {
            AssetKind::Labeled { label, .. } => assert_eq!(label, "Racing Photo 4"),
            other => panic!("unexpected job kind {other:?}"),
        }
    }

    #[test]
    fn zero_counts_drop_categories() {
        let mut cfg = PlaceholderConfig::default();
        cfg.racing.count = 0;
        cfg.background.count = 0;
        let plan = GenerationPlan::from_config(&cfg);
        assert_eq!(plan.len(), 2 + 1 + 2);
    }

    #[test]
    fn needs_generation_checks_presence_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m-logo.png");
        assert!(needs_generation(&path).unwrap());
        fs::write(&path, b"").unwrap();
        assert!(needs_generation(&path).unwrap());
        fs::write(&path, b"x").unwrap();
        assert!(!needs_generation(&path).unwrap());
    }

    #[test]
    fn ensure_output_dir_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/images");
        ensure_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_output_dir(&nested).unwrap();
    }
}
