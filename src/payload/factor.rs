//! Factors
//!
//! A factor stores small integer codes into a table of distinct level
//! strings. Code 0 is NA and never names a level. The table is shared
//! between payloads derived from one another and is only ever extended by
//! copying, so a code keeps naming the same level for as long as the
//! payload holding it lives.

use std::cell::OnceCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use num_complex::Complex64;
use tracing::trace;

use super::arrange::{rank_sorted, sort_indices, Arrangeable};
use super::core::{convert_logged, Payload};
use super::element::{Kind, Opaque};
use super::engine;
use super::group::Groupable;
use super::mapper::{Folder, Mapper, Predicate, Visitor};
use super::nable::{NaMask, Nable};
use super::options::{Config, Opt};
use super::traits::{Coalescer, Comparable, Configurable, Convertible, Sequence};
use super::typed::Typed;
use super::types::StringPayload;
use super::value::Value;

/// Ordered level table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Levels {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl Levels {
    pub fn new() -> Self {
        Levels::default()
    }

    /// Levels in order of first appearance, duplicates dropped
    pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut levels = Levels::new();
        for name in names {
            levels.intern(&name.into());
        }
        levels
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    pub fn name(&self, code: u32) -> Option<&str> {
        let i = (code as usize).checked_sub(1)?;
        self.names.get(i).map(String::as_str)
    }

    pub fn code(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    fn intern(&mut self, name: &str) -> u32 {
        if let Some(code) = self.code(name) {
            return code;
        }

        self.names.push(name.to_string());
        let code = self.names.len() as u32;
        self.index.insert(name.to_string(), code);
        code
    }
}

#[derive(Debug, Clone)]
pub struct FactorPayload {
    codes: Vec<u32>,
    levels: Rc<Levels>,
    config: Config<String>,
    sorted: OnceCell<Vec<usize>>,
}

impl FactorPayload {
    pub fn new(strings: Vec<String>, na: Option<Vec<bool>>) -> Self {
        Self::with_options(strings, na, [])
    }

    pub fn with_options(
        strings: Vec<String>,
        na: Option<Vec<bool>>,
        opts: impl IntoIterator<Item = Opt<String>>,
    ) -> Self {
        let strings = StringPayload::with_options(strings, na, opts);
        Self::empty_like(Rc::new(Levels::new()), strings.config().clone()).encode(&strings)
    }

    /// Wrap existing codes; codes that name no level become NA
    pub fn from_codes(codes: Vec<u32>, levels: Rc<Levels>) -> Self {
        let n = levels.len() as u32;
        let codes = codes.into_iter().map(|c| if c > n { 0 } else { c }).collect();
        FactorPayload {
            codes,
            levels,
            config: Config::default(),
            sorted: OnceCell::new(),
        }
    }

    fn empty_like(levels: Rc<Levels>, config: Config<String>) -> Self {
        FactorPayload { codes: vec![], levels, config, sorted: OnceCell::new() }
    }

    fn derive(&self, codes: Vec<u32>) -> Self {
        FactorPayload {
            config: self.config.resized(self.codes.len(), codes.len()),
            codes,
            levels: self.levels.clone(),
            sorted: OnceCell::new(),
        }
    }

    /// Encode strings against this payload's levels, extending a copy of the
    /// level table when a string has not been seen before
    fn encode(&self, strings: &StringPayload) -> Self {
        let mut levels = self.levels.clone();
        let codes: Vec<u32> = strings
            .iter()
            .map(|x| match x {
                None => 0,
                Some(s) => match levels.code(s) {
                    Some(code) => code,
                    None => Rc::make_mut(&mut levels).intern(s),
                },
            })
            .collect();

        FactorPayload {
            config: self.config.resized(self.codes.len(), codes.len()),
            codes,
            levels,
            sorted: OnceCell::new(),
        }
    }

    pub fn levels(&self) -> Rc<Levels> {
        self.levels.clone()
    }

    pub fn codes(&self) -> Vec<u32> {
        self.codes.clone()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<String> {
        let code = *self.codes.get(index.checked_sub(1)?)?;
        self.levels.name(code).map(String::from)
    }

    pub fn value(&self, index: usize) -> Value {
        self.get(index).map_or(Value::Na, Value::String)
    }

    fn mask(&self) -> NaMask {
        self.codes.iter().map(|&c| c == 0).collect()
    }

    /// Resolve codes to their level strings
    pub fn to_strings(&self) -> StringPayload {
        let data = self
            .codes
            .iter()
            .map(|&c| self.levels.name(c).unwrap_or_default().to_string())
            .collect();
        Typed::from_parts(data, self.mask(), self.config.clone())
    }

    fn order(&self) -> &[usize] {
        self.sorted.get_or_init(|| {
            trace!(kind = %Kind::Factor, len = self.len(), "sorting payload");
            let strings = self.to_strings();
            sort_indices(&self.mask().is_na(), |i, j| {
                let (data, _) = strings.parts();
                strings.is_less(&data[i], &data[j])
            })
        })
    }

    pub fn which(&self, predicate: &Predicate<String>) -> Vec<bool> {
        self.to_strings().which(predicate)
    }

    pub fn apply(&self, mapper: &Mapper<String>) -> Self {
        self.encode(&self.to_strings().apply(mapper))
    }

    pub fn apply_to(&self, indices: &[usize], mapper: &Mapper<String>) -> Self {
        self.encode(&self.to_strings().apply_to(indices, mapper))
    }

    pub fn summarize(&self, folder: &Folder<String>) -> Self {
        self.encode(&self.to_strings().summarize(folder))
    }

    pub fn traverse(&self, visitor: &mut Visitor<String>) {
        self.to_strings().traverse(visitor)
    }

    pub(crate) fn map_strings(&self, f: impl FnOnce(&StringPayload) -> StringPayload) -> Self {
        self.encode(&f(&self.to_strings()))
    }

    pub(crate) fn pad_front(&self, n: usize) -> Self {
        let mut codes = vec![0; n];
        codes.extend_from_slice(&self.codes);
        self.derive(codes)
    }
}

impl Nable for FactorPayload {
    fn has_na(&self) -> bool {
        self.codes.contains(&0)
    }

    fn is_na(&self) -> Vec<bool> {
        self.mask().is_na()
    }

    fn not_na(&self) -> Vec<bool> {
        self.mask().not_na()
    }

    fn with_na(&self) -> Vec<usize> {
        self.mask().with_na()
    }

    fn without_na(&self) -> Vec<usize> {
        self.mask().without_na()
    }
}

impl Arrangeable for FactorPayload {
    fn sorted_indices(&self) -> Vec<usize> {
        self.order().to_vec()
    }

    fn sorted_indices_with_ranks(&self) -> (Vec<usize>, Vec<usize>) {
        let strings = self.to_strings();
        let (data, na) = strings.parts();
        let order = self.order();
        let ranks = rank_sorted(order, na.as_slice(), |i, j| strings.is_equal(&data[i], &data[j]));
        (order.to_vec(), ranks)
    }
}

impl Groupable for FactorPayload {
    fn groups(&self) -> (Vec<Vec<usize>>, Vec<Value>) {
        self.to_strings().groups()
    }

    fn is_unique(&self) -> Vec<bool> {
        self.to_strings().is_unique()
    }
}

impl Comparable for FactorPayload {
    fn eq(&self, needle: &Value) -> Vec<bool> {
        self.to_strings().eq(needle)
    }

    fn gt(&self, needle: &Value) -> Vec<bool> {
        self.to_strings().gt(needle)
    }

    fn lt(&self, needle: &Value) -> Vec<bool> {
        self.to_strings().lt(needle)
    }
}

impl Configurable<String> for FactorPayload {
    fn options(&self) -> Vec<Opt<String>> {
        self.config.options()
    }

    fn set_option(&mut self, opt: Opt<String>) -> bool {
        let reorders = matches!(opt, Opt::Less(_));
        let known = self.config.set(opt);
        if reorders {
            self.sorted = OnceCell::new();
        }
        known
    }
}

impl Sequence for FactorPayload {
    fn len(&self) -> usize {
        self.codes.len()
    }

    fn by_indices(&self, indices: &[usize]) -> Self {
        let (codes, _) = engine::gather(&self.codes, &self.mask(), indices, &0);
        FactorPayload { config: self.config.rearranged(), ..self.derive(codes) }
    }

    fn adjust(&self, n: usize) -> Self {
        let (codes, _) = engine::recycle(&self.codes, &self.mask(), n, &0);
        FactorPayload { config: self.config.rearranged(), ..self.derive(codes) }
    }

    fn append(&self, other: &Payload) -> Self {
        match other {
            Payload::Factor(other) if Rc::ptr_eq(&self.levels, &other.levels) => {
                let mut codes = self.codes.clone();
                codes.extend_from_slice(&other.codes);
                self.derive(codes)
            }
            _ => self.map_strings(|x| x.concat(&convert_logged::<String>(other, "append"))),
        }
    }

    fn str_for_elem(&self, index: usize) -> String {
        match (self.get(index), &self.config.printer) {
            (None, _) => "NA".to_string(),
            (Some(x), Some(printer)) => printer(&x),
            (Some(x), None) => format!("\"{}\"", x),
        }
    }
}

impl Coalescer for FactorPayload {
    fn coalesce(&self, other: &Payload) -> Self {
        if !self.has_na() {
            return self.clone();
        }
        self.map_strings(|x| x.coalesce(other))
    }
}

impl Convertible for FactorPayload {
    fn booleans(&self) -> (Vec<bool>, Vec<bool>) {
        self.to_strings().booleans()
    }

    fn integers(&self) -> (Vec<i64>, Vec<bool>) {
        self.to_strings().integers()
    }

    fn floats(&self) -> (Vec<f64>, Vec<bool>) {
        self.to_strings().floats()
    }

    fn complexes(&self) -> (Vec<Complex64>, Vec<bool>) {
        self.to_strings().complexes()
    }

    fn strings(&self) -> (Vec<String>, Vec<bool>) {
        self.to_strings().into_parts()
    }

    fn times(&self) -> (Vec<DateTime<Utc>>, Vec<bool>) {
        self.to_strings().times()
    }

    fn anys(&self) -> (Vec<Opaque>, Vec<bool>) {
        self.to_strings().anys()
    }
}
