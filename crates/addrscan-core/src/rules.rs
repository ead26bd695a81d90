//! 输入文件加载：地址规则与各类名称集合
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// 单条地址规则（未编译）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub symbol: String,
    pub pat: String,
    /// 在规则文件中的行号（1 起），用于报错
    pub line: usize,
}

/// 地址规则文件的内容：公共模式 + 有序的币种规则
#[derive(Debug, Clone)]
pub struct AddressRules {
    pub source: PathBuf,
    pub common: String,
    /// 顺序即优先级
    pub specs: Vec<RuleSpec>,
}

pub fn load_address_rules(path: &Path) -> Result<AddressRules> {
    let txt = read_input(path)?;
    parse_address_rules(&txt, path)
}

/// 首个非空行为公共模式；其余每行按第一个空格拆成 symbol 与 pattern
pub fn parse_address_rules(txt: &str, source: &Path) -> Result<AddressRules> {
    let mut lines = txt
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let common = match lines.next() {
        Some((_, l)) => l.to_string(),
        None => return Err(ScanError::EmptyRules(source.to_path_buf())),
    };

    let mut specs = Vec::new();
    for (line, l) in lines {
        let (symbol, pat) = match l.split_once(' ') {
            Some((s, p)) if !s.is_empty() && !p.is_empty() => (s, p),
            _ => {
                return Err(ScanError::MalformedRule { path: source.to_path_buf(), line });
            }
        };
        specs.push(RuleSpec { symbol: symbol.to_string(), pat: pat.to_string(), line });
    }

    Ok(AddressRules { source: source.to_path_buf(), common, specs })
}

/// 读取换行分隔的名称集合（小写、忽略空行），用于目录名与 MIME 类型
pub fn load_name_set(path: &Path) -> Result<HashSet<String>> {
    Ok(parse_name_set(&read_input(path)?))
}

/// 读取扩展名集合；与名称集合相同，另外去掉开头的 '.'
pub fn load_ext_set(path: &Path) -> Result<HashSet<String>> {
    Ok(parse_ext_set(&read_input(path)?))
}

/// None 表示未配置，返回空集合
pub fn load_optional_set(
    path: Option<&Path>,
    load: fn(&Path) -> Result<HashSet<String>>,
) -> Result<HashSet<String>> {
    match path {
        Some(p) => load(p),
        None => Ok(HashSet::new()),
    }
}

pub fn parse_name_set(txt: &str) -> HashSet<String> {
    txt.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_lowercase())
        .collect()
}

/// ".EXE" 与 "exe" 等价
pub fn parse_ext_set(txt: &str) -> HashSet<String> {
    txt.lines()
        .map(|l| l.trim())
        .map(|l| l.strip_prefix('.').unwrap_or(l))
        .filter(|l| !l.is_empty())
        .map(|l| l.to_lowercase())
        .collect()
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ScanError::InputFile {
        path: path.to_path_buf(),
        source,
    })
}
