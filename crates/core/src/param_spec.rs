#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Float,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamWidget {
    Default,
    Slider,
    Combo,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamRange {
    /// `max` of `None` leaves the range open above.
    Float { min: f64, max: Option<f64> },
    Int { min: i32, max: i32 },
}

impl ParamRange {
    pub fn contains_float(&self, value: f64) -> bool {
        match *self {
            ParamRange::Float { min, max } => value >= min && max.map_or(true, |max| value <= max),
            ParamRange::Int { min, max } => value >= min as f64 && value <= max as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamOption {
    pub value: i32,
    pub label: &'static str,
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
    pub widget: ParamWidget,
    pub range: Option<ParamRange>,
    pub options: Vec<ParamOption>,
    pub help: Option<&'static str>,
}

impl ParamSpec {
    pub fn new(key: &'static str, label: &'static str, kind: ParamKind) -> Self {
        Self {
            key,
            label,
            kind,
            widget: ParamWidget::Default,
            range: None,
            options: Vec::new(),
            help: None,
        }
    }

    pub fn float_at_least(key: &'static str, label: &'static str, min: f64) -> Self {
        Self::new(key, label, ParamKind::Float).with_range(ParamRange::Float { min, max: None })
    }

    pub fn int_enum(
        key: &'static str,
        label: &'static str,
        options: Vec<(i32, &'static str)>,
    ) -> Self {
        let options = options
            .into_iter()
            .map(|(value, label)| ParamOption { value, label })
            .collect();
        Self::new(key, label, ParamKind::Int).with_options(options)
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Attaches a range and shows the parameter as a slider.
    pub fn with_range(mut self, range: ParamRange) -> Self {
        self.range = Some(range);
        self.widget = ParamWidget::Slider;
        self
    }

    /// Attaches choices and shows the parameter as a combo box.
    pub fn with_options(mut self, options: Vec<ParamOption>) -> Self {
        self.options = options;
        self.widget = ParamWidget::Combo;
        self
    }
}
