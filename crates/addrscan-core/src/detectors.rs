//! 检测器：外层候选模式 + 有序币种规则（两段式匹配）
use regex::Regex;

use crate::error::{Result, ScanError};
use crate::rules::AddressRules;

/// 单条币种规则
#[derive(Debug, Clone)]
pub struct CryptoRule {
    pub symbol: String,
    pub pattern: Regex,
}

/// 两段式地址检测器
/// - 外层：`(?:\A|PRE)(COMMON)(?:POST|\z)`，第 1 捕获组即去掉两侧分隔符后的候选；
/// - 内层：按声明顺序逐条测试，第一条匹配的规则决定币种。
#[derive(Debug, Clone)]
pub struct DetectorSet {
    outer: Regex,
    rules: Vec<CryptoRule>,
}

impl DetectorSet {
    pub fn from_rules(rules: &AddressRules, pre: &str, post: &str) -> Result<Self> {
        // 分隔符类单独校验，便于给出准确的报错
        Regex::new(pre).map_err(ScanError::Delimiter)?;
        Regex::new(post).map_err(ScanError::Delimiter)?;

        let outer_src = format!(r"(?:\A|{pre})({})(?:{post}|\z)", rules.common);
        let outer = Regex::new(&outer_src).map_err(|source| ScanError::Pattern {
            path: rules.source.clone(),
            line: 1,
            source,
        })?;

        let mut compiled = Vec::with_capacity(rules.specs.len());
        for spec in &rules.specs {
            let pattern = Regex::new(&spec.pat).map_err(|source| ScanError::Pattern {
                path: rules.source.clone(),
                line: spec.line,
                source,
            })?;
            compiled.push(CryptoRule { symbol: spec.symbol.clone(), pattern });
        }
        Ok(Self { outer, rules: compiled })
    }

    pub fn rules(&self) -> &[CryptoRule] {
        &self.rules
    }

    /// 惰性产出候选地址（不含分隔符）
    pub fn candidates<'r, 't>(&'r self, text: &'t str) -> Candidates<'r, 't> {
        Candidates { outer: &self.outer, text, at: 0 }
    }

    /// 第一条匹配的规则（按声明顺序）
    pub fn classify(&self, candidate: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|r| r.pattern.is_match(candidate))
            .map(|r| r.symbol.as_str())
    }
}

/// 候选地址迭代器
/// 下一次搜索从本次候选的末尾开始，这样一个分隔符可同时作为前一地址的后界与后一地址的前界。
pub struct Candidates<'r, 't> {
    outer: &'r Regex,
    text: &'t str,
    at: usize,
}

impl<'t> Iterator for Candidates<'_, 't> {
    type Item = &'t str;

    fn next(&mut self) -> Option<&'t str> {
        while self.at <= self.text.len() {
            let caps = self.outer.captures_at(self.text, self.at)?;
            let m = caps.get(1)?;
            if m.is_empty() {
                // 空候选：前进一个字符，防止原地循环
                self.at = match self.text[m.end()..].chars().next() {
                    Some(c) => m.end() + c.len_utf8(),
                    None => self.text.len() + 1,
                };
                continue;
            }
            self.at = m.end();
            return Some(m.as_str());
        }
        None
    }
}
