// src/measurement.rs
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::fmt;

/// Physical dimension a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Angle,
    Length,
    Mass,
    Time,
    Frequency,
    Voltage,
    Current,
    Power,
}

/// Unit of a [`Quantity`], with its factor to the base unit of its dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Radians,
    Degrees,
    Grads,
    Meters,
    Kilometers,
    Feet,
    Miles,
    Kilograms,
    Grams,
    Pounds,
    Seconds,
    Milliseconds,
    Minutes,
    Hertz,
    Kilohertz,
    Volts,
    Kilovolts,
    Amperes,
    Kiloamperes,
    Watts,
    Kilowatts,
    Megawatts,
}

impl Unit {
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Radians | Unit::Degrees | Unit::Grads => Dimension::Angle,
            Unit::Meters | Unit::Kilometers | Unit::Feet | Unit::Miles => Dimension::Length,
            Unit::Kilograms | Unit::Grams | Unit::Pounds => Dimension::Mass,
            Unit::Seconds | Unit::Milliseconds | Unit::Minutes => Dimension::Time,
            Unit::Hertz | Unit::Kilohertz => Dimension::Frequency,
            Unit::Volts | Unit::Kilovolts => Dimension::Voltage,
            Unit::Amperes | Unit::Kiloamperes => Dimension::Current,
            Unit::Watts | Unit::Kilowatts | Unit::Megawatts => Dimension::Power,
        }
    }

    /// Multiply a value in this unit by this factor to get the base unit
    pub fn factor(&self) -> f64 {
        match self {
            Unit::Radians => 1.0,
            Unit::Degrees => PI / 180.0,
            Unit::Grads => PI / 200.0,
            Unit::Meters => 1.0,
            Unit::Kilometers => 1_000.0,
            Unit::Feet => 0.3048,
            Unit::Miles => 1_609.344,
            Unit::Kilograms => 1.0,
            Unit::Grams => 0.001,
            Unit::Pounds => 0.453_592_37,
            Unit::Seconds => 1.0,
            Unit::Milliseconds => 0.001,
            Unit::Minutes => 60.0,
            Unit::Hertz => 1.0,
            Unit::Kilohertz => 1_000.0,
            Unit::Volts => 1.0,
            Unit::Kilovolts => 1_000.0,
            Unit::Amperes => 1.0,
            Unit::Kiloamperes => 1_000.0,
            Unit::Watts => 1.0,
            Unit::Kilowatts => 1_000.0,
            Unit::Megawatts => 1_000_000.0,
        }
    }

    pub fn base(dimension: Dimension) -> Unit {
        match dimension {
            Dimension::Angle => Unit::Radians,
            Dimension::Length => Unit::Meters,
            Dimension::Mass => Unit::Kilograms,
            Dimension::Time => Unit::Seconds,
            Dimension::Frequency => Unit::Hertz,
            Dimension::Voltage => Unit::Volts,
            Dimension::Current => Unit::Amperes,
            Dimension::Power => Unit::Watts,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Radians => "rad",
            Unit::Degrees => "°",
            Unit::Grads => "grad",
            Unit::Meters => "m",
            Unit::Kilometers => "km",
            Unit::Feet => "ft",
            Unit::Miles => "mi",
            Unit::Kilograms => "kg",
            Unit::Grams => "g",
            Unit::Pounds => "lb",
            Unit::Seconds => "s",
            Unit::Milliseconds => "ms",
            Unit::Minutes => "min",
            Unit::Hertz => "Hz",
            Unit::Kilohertz => "kHz",
            Unit::Volts => "V",
            Unit::Kilovolts => "kV",
            Unit::Amperes => "A",
            Unit::Kiloamperes => "kA",
            Unit::Watts => "W",
            Unit::Kilowatts => "kW",
            Unit::Megawatts => "MW",
        }
    }
}

/// Raw scalar handed to consumers of a frame's payload, before a unit is attached
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct MeasurementValue(pub f64);

impl MeasurementValue {
    pub fn in_unit(self, unit: Unit) -> Quantity {
        Quantity::from_unit(self.0, unit)
    }
}

impl From<f32> for MeasurementValue {
    fn from(value: f32) -> Self {
        MeasurementValue(value as f64)
    }
}

impl From<i16> for MeasurementValue {
    fn from(value: i16) -> Self {
        MeasurementValue(value as f64)
    }
}

/// A value tagged with its unit.
///
/// Conversions are explicit; a quantity never turns into a bare `f64` implicitly.
/// Quantities of the same dimension compare by their base-unit value.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    pub fn from_unit(value: f64, unit: Unit) -> Self {
        Quantity { value, unit }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    /// Value expressed in the base unit of this quantity's dimension
    pub fn to_base_unit(&self) -> f64 {
        self.value * self.unit.factor()
    }

    /// Returns `None` when `unit` measures a different dimension
    pub fn convert_to(&self, unit: Unit) -> Option<Quantity> {
        if unit.dimension() != self.dimension() {
            return None;
        }
        Some(Quantity {
            value: self.to_base_unit() / unit.factor(),
            unit,
        })
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.dimension() != other.dimension() {
            return None;
        }
        self.to_base_unit().partial_cmp(&other.to_base_unit())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(precision) => write!(f, "{:.*} {}", precision, self.value, self.unit.symbol()),
            None => write!(f, "{} {}", self.value, self.unit.symbol()),
        }
    }
}
