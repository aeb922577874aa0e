//! The grammar pack: the language-specific inventory the driver consults.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::ccg::category::{Category, CategoryInterner};
use crate::ccg::combinator::BinaryCombinator;
use crate::ccg::error::GrammarLoadError;

/// Whether `possible_root_cats` matches the full category (features
/// included) or only the bare atomic head. Resolves spec.md's Open
/// Question #3; see `DESIGN.md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMatchMode {
    Exact,
    FeatureInsensitive,
}

impl Default for RootMatchMode {
    fn default() -> Self {
        RootMatchMode::Exact
    }
}

/// A single unary rule table entry: child category bucket key → parent
/// category plus the rule label attached to the resulting edge.
type UnaryTable = HashMap<String, Vec<(Arc<Category>, String)>>;

/// Immutable, language-specific parsing resources (spec §4.3). Built once
/// and shared (read-only) across every sentence in a batch.
pub struct GrammarPack {
    pub categories: Vec<Arc<Category>>,
    pub category_index: CategoryInterner,
    pub unary_rules: UnaryTable,
    pub seen_rules: HashSet<(String, String)>,
    pub category_dictionary: HashMap<String, HashSet<usize>>,
    pub root_categories: Option<HashSet<String>>,
    pub root_match_mode: RootMatchMode,
    pub binary_rules: Vec<Box<dyn BinaryCombinator>>,
    pub max_unary_chain: usize,
}

impl GrammarPack {
    pub fn new(categories: Vec<Category>, binary_rules: Vec<Box<dyn BinaryCombinator>>) -> Self {
        let categories: Vec<Arc<Category>> = categories.into_iter().map(Arc::new).collect();
        let category_index = CategoryInterner::seeded(&categories);
        GrammarPack {
            categories,
            category_index,
            unary_rules: HashMap::new(),
            seen_rules: HashSet::new(),
            category_dictionary: HashMap::new(),
            root_categories: None,
            root_match_mode: RootMatchMode::default(),
            binary_rules,
            max_unary_chain: 1,
        }
    }

    fn bucket_key(cat: &Category, mode: RootMatchMode) -> String {
        match mode {
            RootMatchMode::Exact => cat.to_string(),
            RootMatchMode::FeatureInsensitive => cat
                .atomic_name()
                .map(str::to_string)
                .unwrap_or_else(|| cat.to_string()),
        }
    }

    pub fn add_unary_rule(&mut self, child: &Category, parent: Category, rule_name: &str) {
        let key = child.to_string();
        self.unary_rules
            .entry(key)
            .or_default()
            .push((Arc::new(parent), rule_name.to_string()));
    }

    pub fn unary_parents(&self, child: &Category) -> &[(Arc<Category>, String)] {
        self.unary_rules
            .get(&child.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn mark_seen(&mut self, left: &Category, right: &Category) {
        self.seen_rules.insert((left.to_string(), right.to_string()));
    }

    pub fn is_seen(&self, left: &Category, right: &Category) -> bool {
        self.seen_rules
            .contains(&(left.to_string(), right.to_string()))
    }

    pub fn allowed_categories(&self, word: &str) -> Option<&HashSet<usize>> {
        self.category_dictionary.get(word)
    }

    pub fn is_root_admissible(&self, cat: &Category) -> bool {
        match &self.root_categories {
            None => true,
            Some(allowed) => allowed.contains(&Self::bucket_key(cat, self.root_match_mode)),
        }
    }

    pub fn set_root_categories(&mut self, cats: &[Category], mode: RootMatchMode) {
        self.root_match_mode = mode;
        self.root_categories = Some(cats.iter().map(|c| Self::bucket_key(c, mode)).collect());
    }

    /// Load a grammar pack from the four flat-file formats in spec §6:
    /// `categories.txt`, `seen_rules.txt`, `cat_dict.txt`, `unary_rules.txt`.
    /// Rules themselves are not serialized — callers supply `binary_rules`
    /// (e.g. `en_default_binary_rules()`), mirroring how the original keeps
    /// the combinator catalogue in code and only the category inventory on
    /// disk.
    pub fn from_dir(
        dir: &Path,
        binary_rules: Vec<Box<dyn BinaryCombinator>>,
    ) -> Result<Self, GrammarLoadError> {
        let categories = load_categories(dir)?;
        let mut pack = GrammarPack::new(categories, binary_rules);

        load_seen_rules(dir, &mut pack)?;
        load_category_dictionary(dir, &mut pack)?;
        load_unary_rules(dir, &mut pack)?;

        Ok(pack)
    }
}

fn read_lines(dir: &Path, filename: &str) -> Result<Vec<String>, GrammarLoadError> {
    let path = dir.join(filename);
    let contents = fs::read_to_string(&path).map_err(|source| GrammarLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(contents.lines().map(str::to_string).collect())
}

fn load_categories(dir: &Path) -> Result<Vec<Category>, GrammarLoadError> {
    let path = dir.join("categories.txt");
    read_lines(dir, "categories.txt")?
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            Category::parse(line.trim()).map_err(|e| GrammarLoadError::MalformedLine {
                path: path.display().to_string(),
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

fn load_seen_rules(dir: &Path, pack: &mut GrammarPack) -> Result<(), GrammarLoadError> {
    let path = dir.join("seen_rules.txt");
    if !path.exists() {
        return Ok(());
    }
    for (i, line) in read_lines(dir, "seen_rules.txt")?.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let left = parts.next().ok_or_else(|| GrammarLoadError::MalformedLine {
            path: path.display().to_string(),
            line: i + 1,
            message: "missing left category".to_string(),
        })?;
        let right = parts.next().ok_or_else(|| GrammarLoadError::MalformedLine {
            path: path.display().to_string(),
            line: i + 1,
            message: "missing right category".to_string(),
        })?;
        let left_cat = Category::parse(left)?;
        let right_cat = Category::parse(right)?;
        pack.mark_seen(&left_cat, &right_cat);
    }
    Ok(())
}

fn load_category_dictionary(dir: &Path, pack: &mut GrammarPack) -> Result<(), GrammarLoadError> {
    let path = dir.join("cat_dict.txt");
    if !path.exists() {
        return Ok(());
    }
    for (i, line) in read_lines(dir, "cat_dict.txt")?.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, '\t');
        let word = parts.next().ok_or_else(|| GrammarLoadError::MalformedLine {
            path: path.display().to_string(),
            line: i + 1,
            message: "missing word".to_string(),
        })?;
        let csv = parts.next().ok_or_else(|| GrammarLoadError::MalformedLine {
            path: path.display().to_string(),
            line: i + 1,
            message: "missing category index list".to_string(),
        })?;
        let indices: Result<HashSet<usize>, GrammarLoadError> = csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>()
                    .map_err(|_| GrammarLoadError::MalformedLine {
                        path: path.display().to_string(),
                        line: i + 1,
                        message: format!("invalid category index '{}'", s),
                    })
            })
            .collect();
        pack.category_dictionary.insert(word.to_string(), indices?);
    }
    Ok(())
}

fn load_unary_rules(dir: &Path, pack: &mut GrammarPack) -> Result<(), GrammarLoadError> {
    let path = dir.join("unary_rules.txt");
    if !path.exists() {
        return Ok(());
    }
    for (i, line) in read_lines(dir, "unary_rules.txt")?.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let child = parts.next().ok_or_else(|| GrammarLoadError::MalformedLine {
            path: path.display().to_string(),
            line: i + 1,
            message: "missing child category".to_string(),
        })?;
        let parent = parts.next().ok_or_else(|| GrammarLoadError::MalformedLine {
            path: path.display().to_string(),
            line: i + 1,
            message: "missing parent category".to_string(),
        })?;
        let child_cat = Category::parse(child)?;
        let parent_cat = Category::parse(parent)?;
        pack.add_unary_rule(&child_cat, parent_cat, "unary");
    }
    Ok(())
}
