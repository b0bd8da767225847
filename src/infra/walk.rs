//! Gitignore-aware walker with include/exclude globs.
//! - Respects .gitignore, .ignore, .git/info/exclude and the global gitignore
//!   (no enclosing git repository required)
//! - Exclude globs prune directories early and mark files late
//! - Include globs restrict files; `include_priority` settles conflicts
//! - Excluded entries are reported, not dropped, so the tree can mark them
//! - Deterministic ordering for stable output
//!
//! Globs follow doublestar rules: `*` stops at `/`, `**` crosses it, and
//! matching is against the path relative to the walked root.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use tracing::debug;

/// Always excluded, whatever the pattern sources say.
pub const GIT_DIR_GLOB: &str = "**/.git/**";

/// One walked path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry
{
    /// Path as reached from the root argument
    pub path: PathBuf,

    /// Path relative to the root (the file name for a single-file root)
    pub rel: PathBuf,

    pub is_dir: bool,

    /// Matched an exclude glob or missed every include glob
    pub excluded: bool,
}

pub struct FileWalker
{
    /// Exclude globs as given
    exclude: GlobSet,

    /// Exclude globs with a trailing `/**` dropped, so `dir/**` also hits `dir`
    exclude_dirs: GlobSet,

    /// Include globs; empty means everything
    include: Option<GlobSet>,

    /// Include wins when a file matches both sets
    include_priority: bool,

    /// Follow symbolic links; default false
    follow_symlinks: bool,

    /// Honour ignore files; default true
    git_ignore: bool,
}

fn compile(patterns: &[String]) -> Result<GlobSet>
{
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns
    {
        builder.add(
            GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()?,
        );
    }

    Ok(builder.build()?)
}

impl FileWalker
{
    /// Build a walker from exclude globs (e.g. `**/target/**`, `**/*.lock`).
    /// `.git` is always excluded.
    pub fn new(excludes: &[String]) -> Result<Self>
    {
        let mut all = excludes.to_vec();
        all.push(GIT_DIR_GLOB.to_string());

        let dirs: Vec<String> = all
            .iter()
            .map(|p| {
                p.strip_suffix("/**")
                    .unwrap_or(p)
                    .to_string()
            })
            .filter(|p| !p.is_empty() && p != "**")
            .collect();

        Ok(Self {
            exclude: compile(&all)?,
            exclude_dirs: compile(&dirs)?,
            include: None,
            include_priority: false,
            follow_symlinks: false,
            git_ignore: true,
        })
    }

    /// Restrict files to those matching at least one of `includes`.
    pub fn with_includes(
        mut self,
        includes: &[String],
    ) -> Result<Self>
    {
        self.include = if includes.is_empty() { None } else { Some(compile(includes)?) };
        Ok(self)
    }

    /// Keep files matching both an include and an exclude glob.
    pub fn with_include_priority(
        mut self,
        include_priority: bool,
    ) -> Self
    {
        self.include_priority = include_priority;
        self
    }

    pub fn with_follow_symlinks(
        mut self,
        follow: bool,
    ) -> Self
    {
        self.follow_symlinks = follow;
        self
    }

    /// (Optional) Turn ignore-file handling off.
    pub fn with_git_ignore(
        mut self,
        git_ignore: bool,
    ) -> Self
    {
        self.git_ignore = git_ignore;
        self
    }

    /// Whether `rel` matches an exclude glob.
    pub fn is_excluded(
        &self,
        rel: &Path,
    ) -> bool
    {
        self.exclude
            .is_match(rel)
    }

    /// Include/exclude decision for a file at `rel`.
    pub fn should_include_file(
        &self,
        rel: &Path,
    ) -> bool
    {
        let included = self
            .include
            .as_ref()
            .is_none_or(|set| set.is_match(rel));
        let excluded = self.is_excluded(rel);

        if included && excluded
        {
            return self.include_priority;
        }
        included && !excluded
    }

    /// Internal: construct a configured WalkBuilder for `root`, recording
    /// pruned directories into `pruned`.
    fn build_walk(
        &self,
        root: &Path,
        pruned: Arc<Mutex<Vec<PathBuf>>>,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // Dotfiles are handled by the exclude globs, not by the walker
        b.hidden(false);

        b.ignore(self.git_ignore);
        b.git_ignore(self.git_ignore);
        b.git_global(self.git_ignore);
        b.git_exclude(self.git_ignore);
        b.parents(self.git_ignore);
        b.require_git(false);

        b.follow_links(self.follow_symlinks);

        let exclude = self
            .exclude
            .clone();
        let exclude_dirs = self
            .exclude_dirs
            .clone();
        let root = root.to_path_buf();
        b.filter_entry(move |ent: &DirEntry| {
            if ent.depth() == 0
            {
                return true;
            }

            let is_dir = ent
                .file_type()
                .is_some_and(|ft| ft.is_dir());
            if !is_dir
            {
                return true;
            }

            let rel = ent
                .path()
                .strip_prefix(&root)
                .unwrap_or(ent.path());
            if exclude_dirs.is_match(rel) || exclude.is_match(rel)
            {
                if let Ok(mut dirs) = pruned.lock()
                {
                    dirs.push(
                        ent.path()
                            .to_path_buf(),
                    );
                }
                return false;
            }
            true
        });

        b
    }

    /// Walk `root` and report every reachable entry, excluded ones marked.
    ///
    /// A file root yields a single entry. Entries are sorted by relative path.
    pub fn walk<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Vec<WalkEntry>
    {
        let root = root.as_ref();

        if !root.is_dir()
        {
            return self
                .single_file(root)
                .into_iter()
                .collect();
        }

        let pruned = Arc::new(Mutex::new(Vec::new()));
        let walker = self
            .build_walk(root, Arc::clone(&pruned))
            .build();

        let mut out = Vec::new();

        for entry in walker
        {
            let entry = match entry
            {
                Ok(e) => e,
                Err(err) =>
                {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if entry.depth() == 0
            {
                continue;
            }

            let Some(ft) = entry.file_type()
            else
            {
                continue;
            };

            if ft.is_symlink()
            {
                debug!(path = %entry.path().display(), "skipping symlink");
                continue;
            }

            let path = entry.into_path();
            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_path_buf();

            let is_dir = ft.is_dir();
            let excluded = !is_dir && !self.should_include_file(&rel);

            out.push(WalkEntry { path, rel, is_dir, excluded });
        }

        let pruned = match Arc::try_unwrap(pruned)
        {
            Ok(m) => m
                .into_inner()
                .unwrap_or_default(),
            Err(shared) => shared
                .lock()
                .map(|v| v.clone())
                .unwrap_or_default(),
        };

        for path in pruned
        {
            let rel = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_path_buf();
            out.push(WalkEntry { path, rel, is_dir: true, excluded: true });
        }

        out.sort_by(|a, b| a.rel.cmp(&b.rel));
        out
    }

    fn single_file(
        &self,
        path: &Path,
    ) -> Option<WalkEntry>
    {
        if !self.follow_symlinks
            && std::fs::symlink_metadata(path).is_ok_and(|m| {
                m.file_type()
                    .is_symlink()
            })
        {
            debug!(path = %path.display(), "skipping symlinked file");
            return None;
        }

        let rel = PathBuf::from(path.file_name()?);
        let excluded = !self.should_include_file(&rel);

        Some(WalkEntry { path: path.to_path_buf(), rel, is_dir: false, excluded })
    }

    /// Included files under `root`, sorted.
    pub fn walk_files<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Vec<PathBuf>
    {
        self.walk(root)
            .into_iter()
            .filter(|e| !e.is_dir && !e.excluded)
            .map(|e| e.path)
            .collect()
    }
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    /// Create a file with parent dirs as needed
    fn write_file(
        root: &Path,
        rel: &str,
        contents: &str,
    ) -> Result<()>
    {
        let path = root.join(rel);
        if let Some(parent) = path.parent()
        {
            std::fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn rels(files: &[PathBuf], root: &Path) -> Vec<PathBuf>
    {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_path_buf()
            })
            .collect()
    }

    fn globs(patterns: &[&str]) -> Vec<String>
    {
        patterns
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    #[test]
    fn test_file_walking_simple() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "test.rs", "fn main() {}")?;
        write_file(root, "README.md", "# Test")?;

        let walker = FileWalker::new(&[])?;
        let files = walker.walk_files(root);

        assert_eq!(rels(&files, root), vec![PathBuf::from("README.md"), PathBuf::from("test.rs")]);
        Ok(())
    }

    #[test]
    fn test_respects_gitignore_without_repo() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, ".gitignore", "secret.txt\n")?;
        write_file(root, "secret.txt", "hidden")?;
        write_file(root, "keep.txt", "keep")?;

        let walker = FileWalker::new(&globs(&["**/.gitignore"]))?;
        let files = walker.walk_files(root);
        assert_eq!(rels(&files, root), vec![PathBuf::from("keep.txt")]);

        let walker = FileWalker::new(&globs(&["**/.gitignore"]))?.with_git_ignore(false);
        let files = walker.walk_files(root);
        assert_eq!(rels(&files, root).len(), 2);
        Ok(())
    }

    #[test]
    fn test_excluded_dirs_are_pruned_and_reported() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "node_modules/pkg/index.js", "js")?;
        write_file(root, "src/lib.rs", "pub fn x() {}")?;
        write_file(root, "src/app.log", "log")?;

        let walker = FileWalker::new(&globs(&["**/node_modules/**", "**/*.log"]))?;
        let entries = walker.walk(root);

        let summary: Vec<(String, bool, bool)> = entries
            .iter()
            .map(|e| {
                (
                    e.rel
                        .to_string_lossy()
                        .replace('\\', "/"),
                    e.is_dir,
                    e.excluded,
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("node_modules".to_string(), true, true),
                ("src".to_string(), true, false),
                ("src/app.log".to_string(), false, true),
                ("src/lib.rs".to_string(), false, false),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_git_dir_always_excluded() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, ".git/HEAD", "ref: refs/heads/main")?;
        write_file(root, "main.go", "package main")?;

        let files = FileWalker::new(&[])?.walk_files(root);
        assert_eq!(rels(&files, root), vec![PathBuf::from("main.go")]);
        Ok(())
    }

    #[test]
    fn test_star_does_not_cross_directories() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "top.tmp", "x")?;
        write_file(root, "nested/deep.tmp", "x")?;

        let files = FileWalker::new(&globs(&["*.tmp"]))?.walk_files(root);
        assert_eq!(rels(&files, root), vec![PathBuf::from("nested/deep.tmp")]);
        Ok(())
    }

    #[test]
    fn test_includes_and_priority() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        write_file(root, "a.rs", "")?;
        write_file(root, "b.py", "")?;
        write_file(root, "gen.rs", "")?;

        let walker = FileWalker::new(&globs(&["gen.rs"]))?.with_includes(&globs(&["*.rs"]))?;
        assert_eq!(rels(&walker.walk_files(root), root), vec![PathBuf::from("a.rs")]);

        let walker = walker.with_include_priority(true);
        assert_eq!(
            rels(&walker.walk_files(root), root),
            vec![PathBuf::from("a.rs"), PathBuf::from("gen.rs")]
        );
        Ok(())
    }

    #[test]
    fn test_single_file_root() -> Result<()>
    {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        write_file(root, "only.rs", "fn x() {}")?;

        let entries = FileWalker::new(&[])?.walk(root.join("only.rs"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].rel, PathBuf::from("only.rs"));
        assert!(!entries[0].excluded);

        let entries = FileWalker::new(&globs(&["*.rs"]))?.walk(root.join("only.rs"));
        assert!(entries[0].excluded);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped_unless_followed() -> Result<()>
    {
        use std::os::unix::fs::symlink;

        let tmp = TempDir::new()?;
        let root = tmp.path();
        write_file(root, "sub/b.txt", "b")?;
        symlink(root.join("sub/b.txt"), root.join("link_to_b"))?;

        let files = FileWalker::new(&[])?.walk_files(root);
        assert_eq!(rels(&files, root), vec![PathBuf::from("sub/b.txt")]);

        let files = FileWalker::new(&[])?
            .with_follow_symlinks(true)
            .walk_files(root);
        assert!(
            files
                .iter()
                .any(|p| p.ends_with("link_to_b"))
        );
        Ok(())
    }
}
