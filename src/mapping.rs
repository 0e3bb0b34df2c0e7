// src/mapping.rs

//! Obfuscated <-> readable class name table
//!
//! Only class entries are loaded; field and method lines are skipped. Both
//! columns must be unique since each is used as a lookup key, and the table
//! refuses to build otherwise rather than returning an arbitrary match later.
//!
//! Supported formats:
//! - SRG: `CL: a net/minecraft/client/Minecraft`
//! - TSRG (v1 and v2): unindented `a net/minecraft/client/Minecraft`,
//!   members indented below their class
//! - CSRG: `a net/minecraft/client/Minecraft`, members have more columns

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingFormat {
    Srg,
    Tsrg,
    Csrg,
}

impl MappingFormat {
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "srg" => Some(Self::Srg),
            "tsrg" => Some(Self::Tsrg),
            "csrg" => Some(Self::Csrg),
            _ => None,
        }
    }

    /// Guess the format from the first meaningful line
    pub fn sniff(content: &str) -> Self {
        let first = content
            .lines()
            .map(str::trim_end)
            .find(|l| !l.is_empty() && !l.starts_with('#'));

        match first {
            Some(line) if ["PK:", "CL:", "FD:", "MD:"].iter().any(|p| line.starts_with(p)) => {
                Self::Srg
            }
            Some(line) if line.starts_with("tsrg2 ") => Self::Tsrg,
            _ if content.lines().any(|l| l.starts_with('\t') || l.starts_with(' ')) => Self::Tsrg,
            _ => Self::Csrg,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    entries: Vec<(String, String)>,
    by_obfuscated: HashMap<String, usize>,
    by_mapped: HashMap<String, usize>,
}

impl MappingTable {
    /// Build a table from `(obfuscated, mapped)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for (obf, mapped) in pairs {
            table.insert(obf.into(), mapped.into())?;
        }
        Ok(table)
    }

    fn insert(&mut self, obf: String, mapped: String) -> Result<()> {
        if let Some(&idx) = self.by_obfuscated.get(&obf) {
            return Err(Error::MappingError(format!(
                "obfuscated class '{obf}' mapped twice ('{}' and '{mapped}')",
                self.entries[idx].1
            )));
        }
        if let Some(&idx) = self.by_mapped.get(&mapped) {
            return Err(Error::MappingError(format!(
                "mapped class '{mapped}' claimed by both '{}' and '{obf}'",
                self.entries[idx].0
            )));
        }

        let idx = self.entries.len();
        self.by_obfuscated.insert(obf.clone(), idx);
        self.by_mapped.insert(mapped.clone(), idx);
        self.entries.push((obf, mapped));
        Ok(())
    }

    /// Load a mapping file, choosing the format by extension or content
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::NotFoundError(format!("mapping file {}: {e}", path.display()))
        })?;
        let format =
            MappingFormat::from_extension(path).unwrap_or_else(|| MappingFormat::sniff(&content));
        Self::parse(&content, format)
    }

    pub fn parse(content: &str, format: MappingFormat) -> Result<Self> {
        let mut table = Self::default();

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            let pair = match format {
                MappingFormat::Srg => parse_srg_line(line),
                MappingFormat::Tsrg => parse_tsrg_line(line),
                MappingFormat::Csrg => parse_csrg_line(line),
            };

            match pair {
                Ok(Some((obf, mapped))) => table.insert(obf.to_string(), mapped.to_string())?,
                Ok(None) => {}
                Err(msg) => {
                    return Err(Error::ParseError(format!("line {}: {msg}", lineno + 1)));
                }
            }
        }

        Ok(table)
    }

    /// Obfuscated name for a readable class name
    pub fn obfuscated_for(&self, mapped: &str) -> Option<&str> {
        self.by_mapped
            .get(mapped)
            .map(|&idx| self.entries[idx].0.as_str())
    }

    /// Readable class name for an obfuscated name
    pub fn mapped_for(&self, obfuscated: &str) -> Option<&str> {
        self.by_obfuscated
            .get(obfuscated)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(obfuscated, mapped)` pairs in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(o, m)| (o.as_str(), m.as_str()))
    }
}

fn parse_srg_line(line: &str) -> std::result::Result<Option<(&str, &str)>, String> {
    let Some(rest) = line.strip_prefix("CL:") else {
        return Ok(None);
    };
    let mut cols = rest.split_whitespace();
    match (cols.next(), cols.next()) {
        (Some(obf), Some(mapped)) => Ok(Some((obf, mapped))),
        _ => Err(format!("malformed class line '{line}'")),
    }
}

fn parse_tsrg_line(line: &str) -> std::result::Result<Option<(&str, &str)>, String> {
    if line.starts_with('\t') || line.starts_with(' ') || line.starts_with("tsrg2 ") {
        return Ok(None);
    }
    let mut cols = line.split_whitespace();
    match (cols.next(), cols.next()) {
        (Some(obf), Some(mapped)) => Ok(Some((obf, mapped))),
        _ => Err(format!("malformed class line '{line}'")),
    }
}

fn parse_csrg_line(line: &str) -> std::result::Result<Option<(&str, &str)>, String> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    match cols.len() {
        2 => Ok(Some((cols[0], cols[1]))),
        3 | 4 => Ok(None),
        _ => Err(format!("unexpected column count in '{line}'")),
    }
}
