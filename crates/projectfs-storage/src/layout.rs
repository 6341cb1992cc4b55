//! Deterministic project folder layout.
//!
//! A project lives at
//! `{root}/{REGION}/{FULL_YEAR}/{MM}. {Mon}/{projectNumber} - {name}/`.
//! Nothing here touches the disk except [`DiskRoot::probe`], which runs
//! once at startup.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use tracing::{info, warn};

use projectfs_core::config::StorageConfig;
use projectfs_core::error::AppError;
use projectfs_core::result::AppResult;
use projectfs_entity::folder::is_descriptor_name;
use projectfs_entity::project::Project;

/// Three-letter month abbreviations, January first.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Outcome of resolving a project's folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// The canonical absolute path.
    Resolved(PathBuf),
    /// The project's identifiers cannot produce a path.
    Invalid(String),
}

impl PathResolution {
    /// The path, if resolved.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Resolved(p) => Some(p),
            Self::Invalid(_) => None,
        }
    }

    /// Convert into a result, mapping `Invalid` to a validation error.
    pub fn into_result(self) -> AppResult<PathBuf> {
        match self {
            Self::Resolved(p) => Ok(p),
            Self::Invalid(reason) => Err(AppError::validation(reason)),
        }
    }
}

/// Year and month decoded from a `YY-MMNNN` project number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectNumber {
    /// Four-digit year.
    pub year: u16,
    /// Month, 1 to 12.
    pub month: u8,
}

impl ProjectNumber {
    /// Parse the year and month from a project number.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("project number is empty".to_string());
        }
        let (year_part, rest) = raw
            .split_once('-')
            .ok_or_else(|| format!("project number '{raw}' has no '-' separator"))?;

        if year_part.len() != 2 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("project number '{raw}' must start with a two-digit year"));
        }
        let month_part = rest
            .get(..2)
            .filter(|m| m.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| format!("project number '{raw}' has no two-digit month"))?;

        let year = 2000 + year_part.parse::<u16>().map_err(|e| e.to_string())?;
        let month = month_part.parse::<u8>().map_err(|e| e.to_string())?;
        if !(1..=12).contains(&month) {
            return Err(format!("project number '{raw}' has month {month} outside 1-12"));
        }
        Ok(Self { year, month })
    }

    /// The `MM. Mon` directory name.
    pub fn month_dir(&self) -> String {
        format!("{:02}. {}", self.month, MONTHS[usize::from(self.month - 1)])
    }
}

/// A path split into its project-folder coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLocation {
    /// Region directory.
    pub region: String,
    /// Absolute project folder.
    pub project_dir: PathBuf,
    /// The `{projectNumber} - {name}` component.
    pub folder_name: String,
    /// Remaining components below the project folder, `/`-separated.
    pub relative: String,
}

impl ProjectLocation {
    /// Project number parsed from the folder name, if it has one.
    pub fn project_number(&self) -> Option<&str> {
        self.folder_name.split_once(" - ").map(|(number, _)| number)
    }
}

/// The selected disk root plus the default region.
#[derive(Debug, Clone)]
pub struct DiskRoot {
    root: PathBuf,
    default_region: String,
}

impl DiskRoot {
    /// Use `root` directly.
    pub fn new(root: impl Into<PathBuf>, default_region: &str) -> Self {
        Self {
            root: root.into(),
            default_region: normalize_region(default_region).unwrap_or_else(|| "AU".to_string()),
        }
    }

    /// Pick the production mount when it is a directory, else the
    /// development root. The result is absolute, so absolute paths from
    /// clients can be compared against it.
    pub fn probe(config: &StorageConfig) -> Self {
        let production = Path::new(&config.production_root);
        if production.is_dir() {
            info!(root = %production.display(), "Using production project root");
            Self::new(absolutize(production), &config.default_region)
        } else {
            let development = absolutize(Path::new(&config.development_root));
            warn!(
                production = %production.display(),
                development = %development.display(),
                "Production project root not mounted, using development root"
            );
            Self::new(development, &config.default_region)
        }
    }

    /// The selected root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configured default region.
    pub fn default_region(&self) -> &str {
        &self.default_region
    }

    /// Region precedence: explicit argument, then the project's own region,
    /// then the default. Always upper-case.
    pub fn region_for(&self, project: &Project, explicit: Option<&str>) -> String {
        explicit
            .and_then(normalize_region)
            .or_else(|| project.region.as_deref().and_then(normalize_region))
            .unwrap_or_else(|| self.default_region.clone())
    }

    /// `{root}/{REGION}`.
    pub fn region_dir(&self, region: &str) -> PathBuf {
        self.root
            .join(normalize_region(region).unwrap_or_else(|| self.default_region.clone()))
    }

    /// Resolve the folder for `project`, optionally below `relative`.
    pub fn resolve_project_path(
        &self,
        project: &Project,
        relative: &str,
        region: Option<&str>,
    ) -> PathResolution {
        let name = project.name.trim();
        if name.is_empty() {
            return PathResolution::Invalid(format!("project {} has an empty name", project.id));
        }
        if project.name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
            return PathResolution::Invalid(format!(
                "project name '{}' cannot be used as a folder name",
                project.name
            ));
        }

        let number = match ProjectNumber::parse(&project.project_number) {
            Ok(n) => n,
            Err(reason) => return PathResolution::Invalid(reason),
        };

        let relative = match safe_relative(relative) {
            Ok(r) => r,
            Err(reason) => return PathResolution::Invalid(reason),
        };

        let path = self
            .region_dir(&self.region_for(project, region))
            .join(number.year.to_string())
            .join(number.month_dir())
            .join(project.folder_name())
            .join(relative);
        PathResolution::Resolved(path)
    }

    /// Resolve the project's root folder.
    pub fn project_root(&self, project: &Project, region: Option<&str>) -> PathResolution {
        self.resolve_project_path(project, "", region)
    }

    /// Split an absolute path below the root into project coordinates.
    pub fn locate(&self, path: &Path) -> Option<ProjectLocation> {
        let rest = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rest
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.len() < 4 {
            return None;
        }
        let project_dir = self
            .root
            .join(&parts[0])
            .join(&parts[1])
            .join(&parts[2])
            .join(&parts[3]);
        Some(ProjectLocation {
            region: parts[0].clone(),
            project_dir,
            folder_name: parts[3].clone(),
            relative: parts[4..].join("/"),
        })
    }
}

impl fmt::Display for DiskRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Cannot make project root absolute");
        path.to_path_buf()
    })
}

fn normalize_region(region: &str) -> Option<String> {
    let region = region.trim();
    if region.is_empty() || region.contains(['/', '\\', '.', '\0']) {
        return None;
    }
    Some(region.to_uppercase())
}

/// Validate a client-supplied relative path. Rejects `..`, the reserved
/// `__files` marker and the folder descriptor.
pub fn safe_relative(relative: &str) -> Result<PathBuf, String> {
    let mut clean = PathBuf::new();
    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(format!("relative path '{relative}' escapes the project folder")),
            "__files" => return Err("'__files' is a reserved name".to_string()),
            s if is_descriptor_name(s) => {
                return Err(format!("'{s}' is reserved for the folder descriptor"));
            }
            s if s.contains('\0') => return Err("relative path contains a NUL byte".to_string()),
            s => clean.push(s),
        }
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> DiskRoot {
        DiskRoot::new("/srv/projects", "au")
    }

    #[test]
    fn test_month_mapping() {
        let project = Project::new("25-10003", "Tower Fitout");
        let path = root().project_root(&project, None);
        assert_eq!(
            path,
            PathResolution::Resolved(PathBuf::from(
                "/srv/projects/AU/2025/10. Oct/25-10003 - Tower Fitout"
            ))
        );

        let january = Project::new("25-01003", "Depot");
        let resolved = root().project_root(&january, None);
        assert!(resolved.path().unwrap().ends_with("2025/01. Jan/25-01003 - Depot"));
    }

    #[test]
    fn test_invalid_month_and_shapes() {
        for number in ["25-13001", "25-00001", "2025-10003", "25", "", "ab-10003", "25-1"] {
            let project = Project::new(number, "X");
            assert!(
                matches!(root().project_root(&project, None), PathResolution::Invalid(_)),
                "{number} should be invalid"
            );
        }
    }

    #[test]
    fn test_determinism_and_region_segment() {
        let project = Project::new("24-06012", "Warehouse");
        let a = root().project_root(&project, Some("nz"));
        let b = root().project_root(&project, Some("nz"));
        assert_eq!(a, b);
        let au = root().project_root(&project, None);
        assert_eq!(
            a.path().unwrap().strip_prefix("/srv/projects/NZ").unwrap(),
            au.path().unwrap().strip_prefix("/srv/projects/AU").unwrap()
        );
    }

    #[test]
    fn test_region_precedence() {
        let project = Project::new("24-06012", "Warehouse").with_region("us");
        assert_eq!(root().region_for(&project, None), "US");
        assert_eq!(root().region_for(&project, Some("nz")), "NZ");
        assert_eq!(root().region_for(&Project::new("24-06012", "W"), None), "AU");
    }

    #[test]
    fn test_rejects_escaping_names() {
        let project = Project::new("24-06012", "../etc");
        assert!(root().project_root(&project, None).path().is_none());
        let ok = Project::new("24-06012", "Warehouse");
        assert!(root().resolve_project_path(&ok, "../../x", None).path().is_none());
        let nested = root().resolve_project_path(&ok, "Admin/Quotes/", None);
        assert!(nested.path().unwrap().ends_with("24-06012 - Warehouse/Admin/Quotes"));
    }

    #[test]
    fn test_descriptor_is_not_addressable() {
        let ok = Project::new("24-06012", "Warehouse");
        for relative in [".meta.json", "Admin/.meta.json", ".meta.json.tmp"] {
            assert!(
                root().resolve_project_path(&ok, relative, None).path().is_none(),
                "{relative} should be rejected"
            );
        }
        assert!(safe_relative("Admin/notes.meta.json").is_ok());
        assert!(safe_relative(".meta.json.bak").is_ok());
    }

    #[test]
    fn test_development_root_is_made_absolute() {
        let config = StorageConfig {
            production_root: "/definitely/not/mounted/projects".to_string(),
            development_root: "./data/projects".to_string(),
            ..StorageConfig::default()
        };
        let disk = DiskRoot::probe(&config);
        assert!(disk.root().is_absolute());
        assert!(disk.root().ends_with("data/projects"));
        let target = disk.root().join("AU/2025/x.pdf");
        assert!(target.starts_with(disk.root()));
    }

    #[test]
    fn test_locate_splits_project_folder() {
        let loc = root()
            .locate(Path::new(
                "/srv/projects/AU/2025/10. Oct/25-10003 - Tower/Admin/plan.pdf",
            ))
            .unwrap();
        assert_eq!(loc.region, "AU");
        assert_eq!(loc.folder_name, "25-10003 - Tower");
        assert_eq!(loc.project_number(), Some("25-10003"));
        assert_eq!(loc.relative, "Admin/plan.pdf");
        assert!(root().locate(Path::new("/srv/projects/AU/2025")).is_none());
        assert!(root().locate(Path::new("/elsewhere/a/b/c/d")).is_none());
    }
}
