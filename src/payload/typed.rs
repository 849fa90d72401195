use std::cell::OnceCell;

use chrono::{DateTime, Utc};
use num_complex::Complex64;
use tracing::{debug, trace};

use super::arrange::{rank_sorted, sort_indices, Arrangeable};
use super::coercion::CoercibleInto;
use super::core::{convert_logged, Payload, Variant};
use super::element::{Element, Opaque};
use super::engine;
use super::group::{group_by, Groupable, Grouping};
use super::mapper::{Folder, Mapper, Predicate, Visitor};
use super::nable::{NaMask, Nable};
use super::options::{Config, Opt};
use super::traits::{Coalescer, Comparable, Configurable, Convertible, Sequence};
use super::value::Value;

/// A payload of one element type
///
/// Values and NA flags always have the same length, and the value stored at
/// an NA position is the element's default, never data.
///
#[derive(Debug, Clone)]
pub struct Typed<T: Element> {
    data: Vec<T>,
    na: NaMask,
    config: Config<T>,
    sorted: OnceCell<Vec<usize>>,
}

impl<T: Element> Typed<T> {
    pub fn new(data: Vec<T>, na: Option<Vec<bool>>) -> Self {
        Self::with_options(data, na, [])
    }

    /// Build a payload carrying options
    ///
    /// A mask whose length differs from the data gives an empty payload.
    ///
    pub fn with_options(data: Vec<T>, na: Option<Vec<bool>>, opts: impl IntoIterator<Item = Opt<T>>) -> Self {
        let config = Config::from_options(opts);
        let na = match na {
            None => NaMask::none(data.len()),
            Some(na) if na.len() == data.len() => NaMask::new(na),
            Some(na) => {
                debug!(
                    kind = %T::KIND,
                    values = data.len(),
                    flags = na.len(),
                    "mismatched payload lengths, building an empty payload"
                );
                return Self::from_parts(vec![], NaMask::default(), config);
            }
        };
        Self::from_parts(data, na, config)
    }

    pub(crate) fn from_parts(mut data: Vec<T>, na: NaMask, config: Config<T>) -> Self {
        let na = if T::ALWAYS_NA { NaMask::all(data.len()) } else { na };
        for (x, &missing) in data.iter_mut().zip(na.as_slice()) {
            if missing {
                *x = T::na_value();
            }
        }

        Typed { data, na, config, sorted: OnceCell::new() }
    }

    pub fn empty() -> Self {
        Self::from_parts(vec![], NaMask::default(), Config::default())
    }

    /// `n` missing values
    pub fn na(n: usize) -> Self {
        Self::from_parts(vec![T::na_value(); n], NaMask::all(n), Config::default())
    }

    /// A new payload sharing this one's options
    pub(crate) fn derive(&self, data: Vec<T>, na: NaMask) -> Self {
        let config = self.config.resized(self.len(), data.len());
        Self::from_parts(data, na, config)
    }

    pub(crate) fn parts(&self) -> (&[T], &NaMask) {
        (&self.data, &self.na)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The value at a 1-based position, `None` when NA or out of range
    pub fn get(&self, index: usize) -> Option<T> {
        let i = index.checked_sub(1)?;
        match self.na.get(i) {
            true => None,
            false => self.data.get(i).cloned(),
        }
    }

    pub fn value(&self, index: usize) -> Value {
        self.get(index).map_or(Value::Na, |x| x.to_value())
    }

    pub fn values(&self) -> Vec<Option<T>> {
        self.iter().map(|x| x.cloned()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> + '_ {
        self.data
            .iter()
            .zip(self.na.as_slice())
            .map(|(x, &na)| if na { None } else { Some(x) })
    }

    pub fn into_parts(self) -> (Vec<T>, Vec<bool>) {
        (self.data, self.na.is_na())
    }

    pub fn config(&self) -> &Config<T> {
        &self.config
    }

    pub(crate) fn is_less(&self, l: &T, r: &T) -> bool {
        match &self.config.less {
            Some(less) => less(l, r),
            None => l.less(r),
        }
    }

    pub(crate) fn is_equal(&self, l: &T, r: &T) -> bool {
        match &self.config.equal {
            Some(equal) => equal(l, r),
            None => l.equal(r),
        }
    }

    /// Cached sorting permutation, 0-based
    pub(crate) fn order(&self) -> &[usize] {
        self.sorted.get_or_init(|| {
            trace!(kind = %T::KIND, len = self.len(), "sorting payload");
            sort_indices(self.na.as_slice(), |i, j| self.is_less(&self.data[i], &self.data[j]))
        })
    }

    pub fn which(&self, predicate: &Predicate<T>) -> Vec<bool> {
        engine::which(&self.data, &self.na, predicate)
    }

    pub fn apply(&self, mapper: &Mapper<T>) -> Self {
        let (data, na) = engine::apply(&self.data, &self.na, mapper);
        self.derive(data, na)
    }

    pub fn apply_to(&self, indices: &[usize], mapper: &Mapper<T>) -> Self {
        let (data, na) = engine::apply_to(&self.data, &self.na, indices, mapper);
        self.derive(data, na)
    }

    /// Fold into a payload of length one
    pub fn summarize(&self, folder: &Folder<T>) -> Self {
        self.scalar(engine::summarize(&self.data, &self.na, folder))
    }

    pub fn traverse(&self, visitor: &mut Visitor<T>) {
        engine::traverse(&self.data, &self.na, visitor)
    }

    pub(crate) fn scalar(&self, value: Option<T>) -> Self {
        match value {
            Some(x) => self.derive(vec![x], NaMask::none(1)),
            None => self.derive(vec![T::na_value()], NaMask::all(1)),
        }
    }

    /// Convert every element, unrepresentable ones becoming NA
    pub fn coerce<U: Element>(&self) -> Typed<U>
    where
        T: CoercibleInto<U>,
    {
        let (data, na) = self
            .data
            .iter()
            .zip(self.na.as_slice())
            .map(|(x, &na)| match na {
                true => None,
                false => x.coerce_into(),
            })
            .map(|x| match x {
                Some(x) => (x, false),
                None => (U::na_value(), true),
            })
            .unzip::<U, bool, Vec<U>, Vec<bool>>();

        Typed::from_parts(data, NaMask::new(na), self.config.untyped())
    }

    /// Concatenate a payload of the same element type
    pub fn concat(&self, other: &Typed<T>) -> Self {
        let (data, na) = engine::concat(&self.data, &self.na, &other.data, &other.na);
        self.derive(data, na)
    }

    /// Prefix `n` missing values
    pub(crate) fn pad_front(&self, n: usize) -> Self {
        Self::na(n).derive_from(self).concat(self)
    }

    fn derive_from(mut self, other: &Typed<T>) -> Self {
        self.config = other.config.clone();
        self
    }

    /// Group equal values, honouring a custom equality if one is set
    pub fn grouping(&self) -> Grouping<T> {
        match self.config.equal {
            Some(_) => group_by(&self.data, &self.na, |_| (), |l, r| self.is_equal(l, r)),
            None => group_by(&self.data, &self.na, T::key, T::equal),
        }
    }

    fn compare(&self, needle: &Value, test: impl Fn(&T, &T) -> bool) -> Vec<bool> {
        match T::from_value(needle) {
            None => vec![false; self.len()],
            Some(needle) => self
                .iter()
                .map(|x| x.is_some_and(|x| test(x, &needle)))
                .collect(),
        }
    }
}

impl<T: Element> Default for Typed<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Element> From<Vec<T>> for Typed<T> {
    fn from(data: Vec<T>) -> Self {
        Typed::new(data, None)
    }
}

impl<T: Element> From<Vec<Option<T>>> for Typed<T> {
    fn from(values: Vec<Option<T>>) -> Self {
        let (data, na) = values
            .into_iter()
            .map(|x| match x {
                Some(x) => (x, false),
                None => (T::na_value(), true),
            })
            .unzip();
        Typed::new(data, Some(na))
    }
}

impl From<Vec<&str>> for Typed<String> {
    fn from(values: Vec<&str>) -> Self {
        values.into_iter().map(String::from).collect::<Vec<_>>().into()
    }
}

impl From<Vec<Option<&str>>> for Typed<String> {
    fn from(values: Vec<Option<&str>>) -> Self {
        values
            .into_iter()
            .map(|x| x.map(String::from))
            .collect::<Vec<_>>()
            .into()
    }
}

impl<T: Element> Nable for Typed<T> {
    fn has_na(&self) -> bool {
        self.na.has_na()
    }

    fn is_na(&self) -> Vec<bool> {
        self.na.is_na()
    }

    fn not_na(&self) -> Vec<bool> {
        self.na.not_na()
    }

    fn with_na(&self) -> Vec<usize> {
        self.na.with_na()
    }

    fn without_na(&self) -> Vec<usize> {
        self.na.without_na()
    }
}

impl<T: Element> Arrangeable for Typed<T> {
    fn sorted_indices(&self) -> Vec<usize> {
        self.order().to_vec()
    }

    fn sorted_indices_with_ranks(&self) -> (Vec<usize>, Vec<usize>) {
        let order = self.order();
        let ranks = rank_sorted(order, self.na.as_slice(), |i, j| {
            self.is_equal(&self.data[i], &self.data[j])
        });
        (order.to_vec(), ranks)
    }
}

impl<T: Element> Groupable for Typed<T> {
    fn groups(&self) -> (Vec<Vec<usize>>, Vec<Value>) {
        let Grouping { groups, values } = self.grouping();
        let values = values
            .into_iter()
            .map(|x| x.map_or(Value::Na, |x| x.to_value()))
            .collect();
        (groups, values)
    }

    fn is_unique(&self) -> Vec<bool> {
        self.grouping().is_unique(self.len())
    }
}

impl<T: Element> Comparable for Typed<T> {
    fn eq(&self, needle: &Value) -> Vec<bool> {
        self.compare(needle, |x, n| self.is_equal(x, n))
    }

    fn gt(&self, needle: &Value) -> Vec<bool> {
        self.compare(needle, |x, n| self.is_less(n, x))
    }

    fn lt(&self, needle: &Value) -> Vec<bool> {
        self.compare(needle, |x, n| self.is_less(x, n))
    }
}

impl<T: Element> Configurable<T> for Typed<T> {
    fn options(&self) -> Vec<Opt<T>> {
        self.config.options()
    }

    fn set_option(&mut self, opt: Opt<T>) -> bool {
        let reorders = matches!(opt, Opt::Less(_));
        let known = self.config.set(opt);
        if reorders {
            self.sorted = OnceCell::new();
        }
        known
    }
}

impl<T: Variant> Sequence for Typed<T> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn by_indices(&self, indices: &[usize]) -> Self {
        let (data, na) = engine::gather(&self.data, &self.na, indices, &T::na_value());
        Self::from_parts(data, na, self.config.rearranged())
    }

    fn adjust(&self, n: usize) -> Self {
        let (data, na) = engine::recycle(&self.data, &self.na, n, &T::na_value());
        Self::from_parts(data, na, self.config.rearranged())
    }

    fn append(&self, other: &Payload) -> Self {
        match T::typed(other) {
            Some(other) => self.concat(other),
            None => self.concat(&convert_logged::<T>(other, "append")),
        }
    }

    fn str_for_elem(&self, index: usize) -> String {
        match (self.get(index), &self.config.printer) {
            (None, _) => "NA".to_string(),
            (Some(x), Some(printer)) => printer(&x),
            (Some(x), None) => x.format(self.config.precision),
        }
    }
}

impl<T: Variant> Coalescer for Typed<T> {
    fn coalesce(&self, other: &Payload) -> Self {
        if !self.has_na() {
            return self.clone();
        }

        let other = match T::typed(other) {
            Some(other) => other.adjust(self.len()),
            None => convert_logged::<T>(other, "coalesce").adjust(self.len()),
        };
        let (data, na) = engine::coalesce(&self.data, &self.na, &other.data, &other.na);
        self.derive(data, na)
    }
}

impl<T> Convertible for Typed<T>
where
    T: Element
        + CoercibleInto<bool>
        + CoercibleInto<i64>
        + CoercibleInto<f64>
        + CoercibleInto<Complex64>
        + CoercibleInto<String>
        + CoercibleInto<DateTime<Utc>>
        + CoercibleInto<Opaque>,
{
    fn booleans(&self) -> (Vec<bool>, Vec<bool>) {
        self.coerce::<bool>().into_parts()
    }

    fn integers(&self) -> (Vec<i64>, Vec<bool>) {
        self.coerce::<i64>().into_parts()
    }

    fn floats(&self) -> (Vec<f64>, Vec<bool>) {
        self.coerce::<f64>().into_parts()
    }

    fn complexes(&self) -> (Vec<Complex64>, Vec<bool>) {
        self.coerce::<Complex64>().into_parts()
    }

    fn strings(&self) -> (Vec<String>, Vec<bool>) {
        self.coerce::<String>().into_parts()
    }

    fn times(&self) -> (Vec<DateTime<Utc>>, Vec<bool>) {
        self.coerce::<DateTime<Utc>>().into_parts()
    }

    fn anys(&self) -> (Vec<Opaque>, Vec<bool>) {
        self.coerce::<Opaque>().into_parts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::element::Na;
    use crate::payload::options::NamedIndices;
    use crate::payload::types::{AnyPayload, FloatPayload, IntegerPayload, StringPayload, TimePayload};
    use chrono::TimeZone;
    use std::rc::Rc;

    fn int_of(x: &Opaque) -> i64 {
        x.downcast_ref::<i64>().copied().unwrap_or_default()
    }

    #[test]
    fn mismatched_lengths_give_empty() {
        let x = IntegerPayload::new(vec![1, 2, 3], Some(vec![false, true]));
        assert!(x.is_empty());
        assert!(x.is_na().is_empty());
    }

    #[test]
    fn na_positions_hold_the_default() {
        let x = IntegerPayload::new(vec![1, 2, 3], Some(vec![false, true, false]));
        assert_eq!(x.clone().into_parts(), (vec![1, 0, 3], vec![false, true, false]));
        assert_eq!(x.get(2), None);
        assert_eq!(x.get(3), Some(3));
        assert_eq!(x.get(0), None);
        assert_eq!(x.get(4), None);
        assert!(x.value(2).is_na());
    }

    #[test]
    fn by_indices_round_trips() {
        let x = FloatPayload::from(vec![Some(1.0), None, Some(3.0), Some(4.0)]);
        let y = x.by_indices(&[1, 2, 3, 4]);
        assert_eq!(y.values(), x.values());
        assert_eq!(y.is_na(), x.is_na());

        let y = x.by_indices(&[4, 0, 1]);
        assert_eq!(y.values(), vec![Some(4.0), None, Some(1.0)]);
    }

    #[test]
    fn adjust_truncates_and_recycles() {
        let x = FloatPayload::from(vec![Some(1.0), Some(2.0), None, Some(4.0), None]);
        let y = x.adjust(3);
        assert_eq!(y.values(), vec![Some(1.0), Some(2.0), None]);

        let z = y.adjust(10);
        assert_eq!(z.len(), 10);
        assert_eq!(z.with_na(), vec![3, 6, 9]);
        assert_eq!(z.get(10), Some(1.0));
        assert_eq!(z.adjust(3).values(), y.values());
    }

    #[test]
    fn adjust_multiple_cycles() {
        let x = IntegerPayload::from(vec![1, 2, 3]);
        let y = x.adjust(9);
        for m in 0..3 {
            assert_eq!(y.get(m * 3 + 1), Some(1));
            assert_eq!(y.get(m * 3 + 3), Some(3));
        }
        assert_eq!(IntegerPayload::empty().adjust(2).with_na(), vec![1, 2]);
    }

    #[test]
    fn append_converts_other() {
        let x = IntegerPayload::from(vec![1, 2]);
        let y = Payload::from(StringPayload::from(vec!["3", "x"]));
        let z = x.append(&y);
        assert_eq!(z.values(), vec![Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn str_for_elem_uses_options() {
        let mut x = FloatPayload::from(vec![Some(1.0), None, Some(f64::NAN)]);
        assert_eq!(x.str_for_elem(1), "1.000");
        assert_eq!(x.str_for_elem(2), "NA");
        assert_eq!(x.str_for_elem(3), "NaN");

        assert!(x.set_option(Opt::Precision(1)));
        assert_eq!(x.str_for_elem(1), "1.0");

        x.set_option(Opt::printer(|v: &f64| format!("<{v}>")));
        assert_eq!(x.str_for_elem(1), "<1>");
        assert_eq!(x.str_for_elem(2), "NA");
    }

    #[test]
    fn sort_and_rank() {
        let x = IntegerPayload::from(vec![Some(3), Some(1), None, Some(1)]);
        assert_eq!(x.sorted_indices(), vec![1, 3, 0, 2]);
        assert_eq!(x.sorted_indices_with_ranks(), (vec![1, 3, 0, 2], vec![1, 1, 2, 0]));
    }

    #[test]
    fn custom_less_resets_sort_cache() {
        let mut x = IntegerPayload::from(vec![1, 3, 2]);
        assert_eq!(x.sorted_indices(), vec![0, 2, 1]);
        x.set_option(Opt::less(|l: &i64, r: &i64| l > r));
        assert_eq!(x.sorted_indices(), vec![1, 2, 0]);
    }

    #[test]
    fn groups_by_value() {
        let x = StringPayload::from(vec!["a", "b", "a", "c", "b"]);
        let (groups, values) = x.groups();
        assert_eq!(groups, vec![vec![1, 3], vec![2, 5], vec![4]]);
        assert_eq!(values, vec![Value::from("a"), Value::from("b"), Value::from("c")]);
        assert_eq!(x.is_unique(), vec![false, false, false, true, false]);
    }

    #[test]
    fn custom_equality_groups() {
        let mut x = StringPayload::from(vec!["a", "A", "b"]);
        x.set_option(Opt::equal(|l: &String, r: &String| l.eq_ignore_ascii_case(r)));
        let (groups, values) = x.groups();
        assert_eq!(groups, vec![vec![1, 2], vec![3]]);
        assert_eq!(values[0], Value::from("a"));
    }

    #[test]
    fn comparisons() {
        let x = IntegerPayload::from(vec![Some(1), Some(5), None, Some(3)]);
        let three = Value::from(3_i64);
        assert_eq!(x.eq(&three), vec![false, false, false, true]);
        assert_eq!(x.neq(&three), vec![true, true, true, false]);
        assert_eq!(x.gt(&three), vec![false, true, false, false]);
        assert_eq!(x.gte(&three), vec![false, true, false, true]);
        assert_eq!(x.lt(&three), vec![true, false, false, false]);
        assert_eq!(x.lte(&three), vec![true, false, false, true]);

        assert_eq!(x.eq(&Value::Na), vec![false; 4]);
        assert_eq!(x.neq(&Value::from("nope")), vec![true; 4]);
        assert_eq!(x.eq(&Value::from("5")), vec![false, true, false, false]);
    }

    #[test]
    fn finds() {
        use crate::payload::traits::Finder;
        let x = StringPayload::from(vec!["a", "b", "a"]);
        assert_eq!(x.find(&Value::from("a")), Some(1));
        assert_eq!(x.find_all(&Value::from("a")), vec![1, 3]);
        assert_eq!(x.find(&Value::from("z")), None);
    }

    #[test]
    fn coalesce_fills_gaps() {
        let x = IntegerPayload::from(vec![Some(1), None, None]);
        let y = Payload::from(FloatPayload::from(vec![Some(9.7), Some(8.2)]));
        assert_eq!(x.coalesce(&y).values(), vec![Some(1), Some(8), Some(9)]);

        let full = IntegerPayload::from(vec![1, 2]);
        assert_eq!(full.coalesce(&y).values(), full.values());
    }

    #[test]
    fn conversions() {
        let x = FloatPayload::from(vec![Some(1.5), None, Some(f64::NAN), Some(0.0)]);
        assert_eq!(x.integers(), (vec![1, 0, 0, 0], vec![false, true, true, false]));
        assert_eq!(x.booleans(), (vec![true, false, false, false], vec![false, true, true, false]));
        assert_eq!(x.strings().0[0], "1.5");
        assert!(x.times().1[1]);
    }

    #[test]
    fn apply_keeps_options() {
        let x = FloatPayload::with_options(vec![1.0, 2.0], None, [Opt::Precision(0)]);
        let y = x.apply(&Mapper::brief(|v: &f64| v * 10.0));
        assert_eq!(y.str_for_elem(2), "20");
    }

    #[test]
    fn any_sorts_with_custom_less() {
        let values: Vec<Opaque> = vec![Rc::new(30_i64), Rc::new(10_i64), Rc::new(Na), Rc::new(10_i64)];
        let x = AnyPayload::with_options(
            values,
            Some(vec![false, false, true, false]),
            [Opt::less(|l: &Opaque, r: &Opaque| int_of(l) < int_of(r))],
        );
        assert_eq!(x.sorted_indices_with_ranks(), (vec![1, 3, 0, 2], vec![1, 1, 2, 0]));

        let plain: Vec<Opaque> = vec![Rc::new(2_i64), Rc::new(1_i64)];
        let unordered = AnyPayload::new(plain, None);
        assert_eq!(unordered.sorted_indices(), vec![0, 1]);
    }

    #[test]
    fn any_groups_by_default_equality() {
        struct Token;
        let shared: Opaque = Rc::new(Token);
        let values: Vec<Opaque> = vec![
            Rc::new(1_i64),
            shared.clone(),
            Rc::new(1_i64),
            Rc::new(Token),
            shared,
            Rc::new(Na),
        ];
        let x = AnyPayload::new(values, Some(vec![false, false, false, false, false, true]));
        let (groups, values) = x.groups();
        assert_eq!(groups, vec![vec![1, 3], vec![2, 5], vec![4], vec![6]]);
        assert_eq!(values[0], Value::Any(Rc::new(1_i64)));
        assert!(values[3].is_na());
        assert_eq!(x.is_unique(), vec![false, false, false, true, false, true]);
    }

    #[test]
    fn any_groups_by_custom_equality() {
        let values: Vec<Opaque> = vec![Rc::new(4_i64), Rc::new(7_i64), Rc::new(9_i64), Rc::new(2_i64)];
        let x = AnyPayload::with_options(
            values,
            None,
            [Opt::equal(|l: &Opaque, r: &Opaque| int_of(l) % 2 == int_of(r) % 2)],
        );
        let (groups, _) = x.groups();
        assert_eq!(groups, vec![vec![1, 4], vec![2, 3]]);
    }

    #[test]
    fn times_sort_and_group() {
        let t = |s| Utc.timestamp_opt(s, 0).unwrap();
        let x = TimePayload::from(vec![Some(t(50)), None, Some(t(10)), Some(t(50))]);
        assert_eq!(x.sorted_indices_with_ranks(), (vec![2, 0, 3, 1], vec![1, 2, 2, 0]));

        let (groups, values) = x.groups();
        assert_eq!(groups, vec![vec![1, 4], vec![3], vec![2]]);
        assert_eq!(values[1], Value::from(t(10)));
    }

    #[test]
    fn names_dropped_when_layout_changes() {
        let mut names = NamedIndices::new();
        names.insert("c".to_string(), vec![3]);
        let x = IntegerPayload::with_options(vec![1, 2, 3], None, [Opt::names(names)]);

        assert!(x.apply(&Mapper::brief(|v: &i64| v + 1)).config().names.is_some());
        assert!(x.by_indices(&[1]).config().names.is_none());
        assert!(x.by_indices(&[3, 2, 1]).config().names.is_none());
        assert!(x.adjust(3).config().names.is_none());
        assert!(x.append(&Payload::from(IntegerPayload::from(vec![4]))).config().names.is_none());
        assert_eq!(x.by_indices(&[1]).config().precision, x.config().precision);
    }
}
