use std::fmt::Debug;
use std::rc::Rc;

use hashbrown::HashMap;

/// Decimal digits used when formatting floats and complexes
pub const DEFAULT_PRECISION: usize = 3;

pub type Printer<T> = Rc<dyn Fn(&T) -> String>;
pub type Relation<T> = Rc<dyn Fn(&T, &T) -> bool>;
pub type NamedIndices = HashMap<String, Vec<usize>>;

/// Payload options
///
/// Options configure how a payload formats, compares and orders its
/// elements. They never change the data itself.
///
pub enum Opt<T> {
    Precision(usize),
    Printer(Printer<T>),
    Equal(Relation<T>),
    Less(Relation<T>),
    /// Name to 1-based positions, carried for the vector layer
    NamedIndices(Rc<NamedIndices>),
}

impl<T> Opt<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Opt::Precision(_) => "precision",
            Opt::Printer(_) => "printer",
            Opt::Equal(_) => "equal",
            Opt::Less(_) => "less",
            Opt::NamedIndices(_) => "names",
        }
    }

    pub fn printer(f: impl Fn(&T) -> String + 'static) -> Self {
        Opt::Printer(Rc::new(f))
    }

    pub fn equal(f: impl Fn(&T, &T) -> bool + 'static) -> Self {
        Opt::Equal(Rc::new(f))
    }

    pub fn less(f: impl Fn(&T, &T) -> bool + 'static) -> Self {
        Opt::Less(Rc::new(f))
    }

    pub fn names(names: NamedIndices) -> Self {
        Opt::NamedIndices(Rc::new(names))
    }
}

impl<T> Clone for Opt<T> {
    fn clone(&self) -> Self {
        match self {
            Opt::Precision(p) => Opt::Precision(*p),
            Opt::Printer(f) => Opt::Printer(f.clone()),
            Opt::Equal(f) => Opt::Equal(f.clone()),
            Opt::Less(f) => Opt::Less(f.clone()),
            Opt::NamedIndices(n) => Opt::NamedIndices(n.clone()),
        }
    }
}

impl<T> Debug for Opt<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Opt::Precision(p) => write!(f, "Precision({p})"),
            Opt::NamedIndices(n) => write!(f, "NamedIndices({:?})", n),
            other => write!(f, "{}(..)", other.name()),
        }
    }
}

/// The options currently in effect for one payload
pub struct Config<T> {
    pub precision: usize,
    pub printer: Option<Printer<T>>,
    pub equal: Option<Relation<T>>,
    pub less: Option<Relation<T>>,
    pub names: Option<Rc<NamedIndices>>,
}

impl<T> Default for Config<T> {
    fn default() -> Self {
        Config {
            precision: DEFAULT_PRECISION,
            printer: None,
            equal: None,
            less: None,
            names: None,
        }
    }
}

impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Config {
            precision: self.precision,
            printer: self.printer.clone(),
            equal: self.equal.clone(),
            less: self.less.clone(),
            names: self.names.clone(),
        }
    }
}

impl<T> Config<T> {
    /// Settings for a payload of `len` elements derived from one of `was`
    /// elements; named positions only survive when the layout is unchanged
    pub(crate) fn resized(&self, was: usize, len: usize) -> Self {
        let mut config = self.clone();
        if was != len {
            config.names = None;
        }
        config
    }

    /// Settings for a payload whose positions were rearranged
    pub(crate) fn rearranged(&self) -> Self {
        Config { names: None, ..self.clone() }
    }
}

impl<T> Debug for Config<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("precision", &self.precision)
            .field("printer", &self.printer.is_some())
            .field("equal", &self.equal.is_some())
            .field("less", &self.less.is_some())
            .field("names", &self.names)
            .finish()
    }
}

impl<T> Config<T> {
    pub fn from_options(opts: impl IntoIterator<Item = Opt<T>>) -> Self {
        let mut config = Config::default();
        for opt in opts {
            config.set(opt);
        }
        config
    }

    /// Apply an option, reporting whether it was recognized
    pub fn set(&mut self, opt: Opt<T>) -> bool {
        match opt {
            Opt::Precision(p) => self.precision = p,
            Opt::Printer(f) => self.printer = Some(f),
            Opt::Equal(f) => self.equal = Some(f),
            Opt::Less(f) => self.less = Some(f),
            Opt::NamedIndices(n) => self.names = Some(n),
        }
        true
    }

    /// Current settings, precision first
    pub fn options(&self) -> Vec<Opt<T>> {
        let mut opts = vec![Opt::Precision(self.precision)];
        opts.extend(self.printer.clone().map(Opt::Printer));
        opts.extend(self.equal.clone().map(Opt::Equal));
        opts.extend(self.less.clone().map(Opt::Less));
        opts.extend(self.names.clone().map(Opt::NamedIndices));
        opts
    }

    /// Carry the options that do not depend on the element type into
    /// a configuration for another element type
    pub fn untyped<U>(&self) -> Config<U> {
        Config {
            precision: self.precision,
            names: self.names.clone(),
            ..Config::default()
        }
    }
}
