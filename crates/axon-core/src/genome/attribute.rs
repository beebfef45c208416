use crate::random_provider;
use axon_error::{AxonResult, axon_bail, ensure};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A single named, typed, mutable gene parameter.
///
/// Attributes come in four kinds (float, int, bool, and categorical string),
/// all carrying a `mutate_rate` in `[0, 1]`. Every kind can be read through
/// the float/bool/string coercions, copied via `Clone`, and mutated in place.
/// Validation happens at construction; numeric kinds additionally clamp their
/// value into `[min_value, max_value]` on initialization and after every
/// mutation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Attribute {
    Float(FloatAttribute),
    Int(IntAttribute),
    Bool(BoolAttribute),
    Str(StringAttribute),
}

impl Attribute {
    pub fn name(&self) -> &str {
        match self {
            Attribute::Float(attr) => &attr.name,
            Attribute::Int(attr) => &attr.name,
            Attribute::Bool(attr) => &attr.name,
            Attribute::Str(attr) => &attr.name,
        }
    }

    pub fn mutate_rate(&self) -> f32 {
        match self {
            Attribute::Float(attr) => attr.mutate_rate,
            Attribute::Int(attr) => attr.mutate_rate,
            Attribute::Bool(attr) => attr.mutate_rate,
            Attribute::Str(attr) => attr.mutate_rate,
        }
    }

    /// Float coercion: bools read as 1.0/0.0, strings parse as decimal and
    /// fall back to 0.0.
    pub fn float_value(&self) -> f32 {
        match self {
            Attribute::Float(attr) => attr.value,
            Attribute::Int(attr) => attr.value as f32,
            Attribute::Bool(attr) => {
                if attr.value {
                    1.0
                } else {
                    0.0
                }
            }
            Attribute::Str(attr) => attr.value.parse::<f32>().unwrap_or(0.0),
        }
    }

    /// Bool coercion: numerics read as `value != 0`, strings as non-empty.
    pub fn bool_value(&self) -> bool {
        match self {
            Attribute::Float(attr) => attr.value != 0.0,
            Attribute::Int(attr) => attr.value != 0,
            Attribute::Bool(attr) => attr.value,
            Attribute::Str(attr) => !attr.value.is_empty(),
        }
    }

    pub fn string_value(&self) -> String {
        match self {
            Attribute::Float(attr) => attr.value.to_string(),
            Attribute::Int(attr) => attr.value.to_string(),
            Attribute::Bool(attr) => attr.value.to_string(),
            Attribute::Str(attr) => attr.value.clone(),
        }
    }

    /// Mutates the value in place with probability `mutate_rate`.
    pub fn mutate_value(&mut self) {
        match self {
            Attribute::Float(attr) => attr.mutate_value(),
            Attribute::Int(attr) => attr.mutate_value(),
            Attribute::Bool(attr) => attr.mutate_value(),
            Attribute::Str(attr) => attr.mutate_value(),
        }
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Float(attr) => write!(
                f,
                "Float Attribute '{}' = {} (mr: {}, mp: {}, min: {}, max: {})",
                attr.name, attr.value, attr.mutate_rate, attr.mutate_power, attr.min_value, attr.max_value
            ),
            Attribute::Int(attr) => write!(
                f,
                "Int Attribute '{}' = {} (mr: {}, mp: {}, min: {}, max: {})",
                attr.name, attr.value, attr.mutate_rate, attr.mutate_power, attr.min_value, attr.max_value
            ),
            Attribute::Bool(attr) => {
                write!(f, "Bool Attribute '{}' = {} (mr: {})", attr.name, attr.value, attr.mutate_rate)
            }
            Attribute::Str(attr) => write!(
                f,
                "String Attribute '{}' = '{}' (mr: {}, options: {:?})",
                attr.name, attr.value, attr.mutate_rate, attr.options
            ),
        }
    }
}

fn validate_mutate_rate(rate: f32) -> AxonResult<()> {
    ensure!(rate >= 0.0, InvalidConfig: "mutate rate ({}) must be at least 0", rate);
    ensure!(rate <= 1.0, InvalidConfig: "mutate rate ({}) must be at most 1", rate);
    Ok(())
}

/// A Gaussian perturbation sample with standard deviation `stdev`; zero
/// stdev yields exactly zero rather than a degenerate Box-Muller draw.
fn perturbation(stdev: f32) -> f32 {
    if stdev == 0.0 {
        0.0
    } else {
        random_provider::gaussian(0.0, stdev as f64) as f32
    }
}

fn initial_value(mean: f32, stdev: f32, init_type: &str, min: f32, max: f32) -> AxonResult<f32> {
    let value = match init_type {
        "gauss" | "gaussian" | "normal" => mean + perturbation(stdev),
        "uniform" => {
            if min == max {
                min
            } else {
                random_provider::range(min..max)
            }
        }
        _ => axon_bail!(InvalidConfig: "invalid init_type '{}' provided", init_type),
    };

    Ok(value.clamp(min, max))
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FloatAttribute {
    name: String,
    value: f32,
    mean: f32,
    stdev: f32,
    init_type: String,
    mutate_rate: f32,
    mutate_power: f32,
    min_value: f32,
    max_value: f32,
}

impl FloatAttribute {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        mean: f32,
        stdev: f32,
        init_type: impl Into<String>,
        mutate_rate: f32,
        mutate_power: f32,
        min_value: f32,
        max_value: f32,
    ) -> AxonResult<Self> {
        let mut attr = FloatAttribute {
            name: name.into(),
            value: 0.0,
            mean,
            stdev,
            init_type: init_type.into(),
            mutate_rate,
            mutate_power,
            min_value,
            max_value,
        };

        attr.validate()?;
        attr.value = initial_value(mean, stdev, &attr.init_type, min_value, max_value)?;

        Ok(attr)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn mutate_value(&mut self) {
        if random_provider::bool(self.mutate_rate) {
            self.value = (self.value + perturbation(self.mutate_power))
                .clamp(self.min_value, self.max_value);
        }
    }

    fn validate(&self) -> AxonResult<()> {
        ensure!(
            self.min_value <= self.max_value,
            InvalidConfig: "min value ({}) must not exceed max value ({})", self.min_value, self.max_value
        );
        ensure!(
            self.mean <= self.max_value,
            InvalidConfig: "mean ({}) must not exceed max value ({})", self.mean, self.max_value
        );
        ensure!(
            self.mean >= self.min_value,
            InvalidConfig: "mean ({}) must not fall below min value ({})", self.mean, self.min_value
        );
        ensure!(self.stdev >= 0.0, InvalidConfig: "stdev ({}) must be at least 0", self.stdev);
        ensure!(
            self.mutate_power >= 0.0,
            InvalidConfig: "mutate power ({}) must be at least 0", self.mutate_power
        );
        validate_mutate_rate(self.mutate_rate)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntAttribute {
    name: String,
    value: i32,
    mean: f32,
    stdev: f32,
    init_type: String,
    mutate_rate: f32,
    mutate_power: f32,
    min_value: i32,
    max_value: i32,
}

impl IntAttribute {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        mean: f32,
        stdev: f32,
        init_type: impl Into<String>,
        mutate_rate: f32,
        mutate_power: f32,
        min_value: i32,
        max_value: i32,
    ) -> AxonResult<Self> {
        let mut attr = IntAttribute {
            name: name.into(),
            value: 0,
            mean,
            stdev,
            init_type: init_type.into(),
            mutate_rate,
            mutate_power,
            min_value,
            max_value,
        };

        attr.validate()?;

        attr.value = match attr.init_type.as_str() {
            "gauss" | "gaussian" | "normal" => (mean + perturbation(stdev)) as i32,
            "uniform" => {
                if min_value == max_value {
                    min_value
                } else {
                    random_provider::range(min_value as i64..max_value as i64 + 1) as i32
                }
            }
            other => axon_bail!(InvalidConfig: "invalid init_type '{}' provided", other),
        }
        .clamp(min_value, max_value);

        Ok(attr)
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn mutate_value(&mut self) {
        if random_provider::bool(self.mutate_rate) {
            let delta = perturbation(self.mutate_power).round() as i32;
            self.value = (self.value + delta).clamp(self.min_value, self.max_value);
        }
    }

    fn validate(&self) -> AxonResult<()> {
        ensure!(
            self.min_value <= self.max_value,
            InvalidConfig: "min value ({}) must not exceed max value ({})", self.min_value, self.max_value
        );
        ensure!(
            self.mean <= self.max_value as f32,
            InvalidConfig: "mean ({}) must not exceed max value ({})", self.mean, self.max_value
        );
        ensure!(
            self.mean >= self.min_value as f32,
            InvalidConfig: "mean ({}) must not fall below min value ({})", self.mean, self.min_value
        );
        ensure!(self.stdev >= 0.0, InvalidConfig: "stdev ({}) must be at least 0", self.stdev);
        ensure!(
            self.mutate_power >= 0.0,
            InvalidConfig: "mutate power ({}) must be at least 0", self.mutate_power
        );
        validate_mutate_rate(self.mutate_rate)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoolAttribute {
    name: String,
    value: bool,
    mutate_rate: f32,
}

impl BoolAttribute {
    pub fn new(name: impl Into<String>, default_value: bool, mutate_rate: f32) -> AxonResult<Self> {
        validate_mutate_rate(mutate_rate)?;

        Ok(BoolAttribute {
            name: name.into(),
            value: default_value,
            mutate_rate,
        })
    }

    pub fn value(&self) -> bool {
        self.value
    }

    /// Assigns the value directly, keeping the mutate rate intact. Used by
    /// connection enable/disable flips.
    pub(crate) fn set_value(&mut self, value: bool) {
        self.value = value;
    }

    pub fn mutate_value(&mut self) {
        if random_provider::bool(self.mutate_rate) {
            self.value = random_provider::bool(0.5);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StringAttribute {
    name: String,
    value: String,
    mutate_rate: f32,
    options: Vec<String>,
}

impl StringAttribute {
    pub fn new(
        name: impl Into<String>,
        mutate_rate: f32,
        options: Vec<String>,
    ) -> AxonResult<Self> {
        validate_mutate_rate(mutate_rate)?;
        ensure!(
            !options.is_empty(),
            InvalidConfig: "at least one option must be provided to a string attribute"
        );

        let value = random_provider::choose(&options).clone();

        Ok(StringAttribute {
            name: name.into(),
            value,
            mutate_rate,
            options,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn mutate_value(&mut self) {
        if random_provider::bool(self.mutate_rate) {
            self.value = random_provider::choose(&self.options).clone();
        }
    }
}
