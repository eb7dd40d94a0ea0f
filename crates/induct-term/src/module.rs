//! Modules and definitions handed to the semantics compiler
//!
//! A [`Definition`] is a serialisation unit: an ordered bundle of modules,
//! each carrying symbol declarations, rules and claims, plus the import
//! edges between them. The only structural requirement is that the imports
//! form a DAG rooted in the bundle or in declared external modules.

use crate::claim::{Claim, Rule};
use crate::error::ModuleError;
use crate::term::Sort;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Attributes on a symbol declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolAttribute {
    /// Declared as a function rather than a constructor
    Function,
    /// Defined on every input
    Total,
    /// The rewrite system must not evaluate it; it stays opaque
    NoEvaluators,
}

/// Declaration of a new symbol `name(params...) : sort`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDeclaration {
    pub name: String,
    pub sort: Sort,
    #[serde(default)]
    pub params: Vec<Sort>,
    #[serde(default)]
    pub attributes: Vec<SymbolAttribute>,
}

impl SymbolDeclaration {
    /// A 0-ary, total, uninterpreted constant with no evaluation rules
    pub fn opaque_constant(name: impl Into<String>, sort: Sort) -> Self {
        Self {
            name: name.into(),
            sort,
            params: Vec::new(),
            attributes: vec![
                SymbolAttribute::Function,
                SymbolAttribute::Total,
                SymbolAttribute::NoEvaluators,
            ],
        }
    }

    pub fn has_attribute(&self, attribute: &SymbolAttribute) -> bool {
        self.attributes.contains(attribute)
    }
}

/// One entry of a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "sentence", rename_all = "lowercase")]
pub enum Sentence {
    Symbol(SymbolDeclaration),
    Rule(Rule),
    Claim(Claim),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            imports: Vec::new(),
            sentences: Vec::new(),
        }
    }

    #[must_use]
    pub fn import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    #[must_use]
    pub fn sentence(mut self, sentence: Sentence) -> Self {
        self.sentences.push(sentence);
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.sentences.iter().filter_map(|s| match s {
            Sentence::Rule(r) => Some(r),
            _ => None,
        })
    }

    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.sentences.iter().filter_map(|s| match s {
            Sentence::Claim(c) => Some(c),
            _ => None,
        })
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolDeclaration> {
        self.sentences.iter().filter_map(|s| match s {
            Sentence::Symbol(d) => Some(d),
            _ => None,
        })
    }
}

/// A bundle of modules with a designated main module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub main_module: String,
    /// Source files the bundle builds on (e.g. the base semantics)
    #[serde(default)]
    pub requires: Vec<PathBuf>,
    pub modules: Vec<Module>,
}

impl Definition {
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Check that every import resolves and that imports are acyclic.
    ///
    /// `external` lists modules provided by `requires`; they are treated as leaves.
    pub fn validate_imports(&self, external: &[&str]) -> Result<(), ModuleError> {
        let mut by_name: HashMap<&str, &Module> = HashMap::new();
        for module in &self.modules {
            if by_name.insert(module.name.as_str(), module).is_some() {
                return Err(ModuleError::DuplicateModule(module.name.clone()));
            }
        }
        if !by_name.contains_key(self.main_module.as_str()) {
            return Err(ModuleError::MissingMainModule(self.main_module.clone()));
        }
        for module in &self.modules {
            for import in &module.imports {
                if !by_name.contains_key(import.as_str()) && !external.contains(&import.as_str()) {
                    return Err(ModuleError::UnknownImport {
                        module: module.name.clone(),
                        import: import.clone(),
                    });
                }
            }
        }

        let mut done: HashSet<&str> = HashSet::new();
        for module in &self.modules {
            let mut path = Vec::new();
            visit(module.name.as_str(), &by_name, &mut done, &mut path)?;
        }
        Ok(())
    }
}

/// Depth-first walk; `path` holds the current import chain
fn visit<'a>(
    name: &'a str,
    by_name: &HashMap<&'a str, &'a Module>,
    done: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Result<(), ModuleError> {
    if done.contains(name) {
        return Ok(());
    }
    if let Some(start) = path.iter().position(|m| *m == name) {
        let mut cycle: Vec<String> = path[start..].iter().map(|m| m.to_string()).collect();
        cycle.push(name.to_string());
        return Err(ModuleError::ImportCycle { cycle });
    }
    // External modules are leaves
    let Some(&module) = by_name.get(name) else {
        done.insert(name);
        return Ok(());
    };
    path.push(name);
    for import in &module.imports {
        visit(import.as_str(), by_name, done, path)?;
    }
    path.pop();
    done.insert(name);
    Ok(())
}
