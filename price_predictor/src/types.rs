use serde::{Deserialize, Serialize};

/// Car brands the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKey {
    #[serde(rename = "Citroën")]
    Citroen,
    Peugeot,
    #[serde(rename = "PGO")]
    Pgo,
    Renault,
    Audi,
    #[serde(rename = "BMW")]
    Bmw,
    Mercedes,
    Opel,
    Volkswagen,
    Ferrari,
    Mitsubishi,
    Nissan,
    #[serde(rename = "SEAT")]
    Seat,
    Subaru,
    Toyota,
    #[serde(rename = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fuel {
    Diesel,
    Petrol,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintColor {
    Black,
    Grey,
    White,
    Red,
    Silver,
    Blue,
    Beige,
    Brown,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarType {
    Convertible,
    Coupe,
    Estate,
    Hatchback,
    Sedan,
    Subcompact,
    Suv,
    Van,
}

/// Wire label of a closed-enumeration value, as the preprocessor artifact
/// stores its fitted categories.
pub trait Label {
    fn label(&self) -> &'static str;
}

impl Label for ModelKey {
    fn label(&self) -> &'static str {
        match self {
            ModelKey::Citroen => "Citroën",
            ModelKey::Peugeot => "Peugeot",
            ModelKey::Pgo => "PGO",
            ModelKey::Renault => "Renault",
            ModelKey::Audi => "Audi",
            ModelKey::Bmw => "BMW",
            ModelKey::Mercedes => "Mercedes",
            ModelKey::Opel => "Opel",
            ModelKey::Volkswagen => "Volkswagen",
            ModelKey::Ferrari => "Ferrari",
            ModelKey::Mitsubishi => "Mitsubishi",
            ModelKey::Nissan => "Nissan",
            ModelKey::Seat => "SEAT",
            ModelKey::Subaru => "Subaru",
            ModelKey::Toyota => "Toyota",
            ModelKey::Other => "other",
        }
    }
}

impl Label for Fuel {
    fn label(&self) -> &'static str {
        match self {
            Fuel::Diesel => "diesel",
            Fuel::Petrol => "petrol",
            Fuel::Other => "other",
        }
    }
}

impl Label for PaintColor {
    fn label(&self) -> &'static str {
        match self {
            PaintColor::Black => "black",
            PaintColor::Grey => "grey",
            PaintColor::White => "white",
            PaintColor::Red => "red",
            PaintColor::Silver => "silver",
            PaintColor::Blue => "blue",
            PaintColor::Beige => "beige",
            PaintColor::Brown => "brown",
            PaintColor::Other => "other",
        }
    }
}

impl Label for CarType {
    fn label(&self) -> &'static str {
        match self {
            CarType::Convertible => "convertible",
            CarType::Coupe => "coupe",
            CarType::Estate => "estate",
            CarType::Hatchback => "hatchback",
            CarType::Sedan => "sedan",
            CarType::Subcompact => "subcompact",
            CarType::Suv => "suv",
            CarType::Van => "van",
        }
    }
}

/// One car to price. Field names are the wire contract of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarDescription {
    pub model_key: ModelKey,
    pub mileage: f64,
    pub engine_power: f64,
    pub fuel: Fuel,
    pub paint_color: PaintColor,
    pub car_type: CarType,
    pub private_parking_available: bool,
    pub has_gps: bool,
    pub has_air_conditioning: bool,
    pub automatic_car: bool,
    pub has_getaround_connect: bool,
    pub has_speed_regulator: bool,
    pub winter_tires: bool,
}

impl CarDescription {
    /// Numeric column by its training-time name.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "mileage" => Some(self.mileage),
            "engine_power" => Some(self.engine_power),
            _ => None,
        }
    }

    /// Categorical column label by its training-time name.
    pub fn categorical(&self, column: &str) -> Option<&'static str> {
        match column {
            "model_key" => Some(self.model_key.label()),
            "fuel" => Some(self.fuel.label()),
            "paint_color" => Some(self.paint_color.label()),
            "car_type" => Some(self.car_type.label()),
            _ => None,
        }
    }

    /// Boolean flag by its training-time name.
    pub fn flag(&self, column: &str) -> Option<bool> {
        match column {
            "private_parking_available" => Some(self.private_parking_available),
            "has_gps" => Some(self.has_gps),
            "has_air_conditioning" => Some(self.has_air_conditioning),
            "automatic_car" => Some(self.automatic_car),
            "has_getaround_connect" => Some(self.has_getaround_connect),
            "has_speed_regulator" => Some(self.has_speed_regulator),
            "winter_tires" => Some(self.winter_tires),
            _ => None,
        }
    }

    /// Type checks serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("mileage", self.mileage), ("engine_power", self.engine_power)] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a finite non-negative number, got {}", name, value));
            }
        }
        Ok(())
    }

    /// An arbitrary valid car; used to resolve column names and to warm up
    /// the model at startup.
    pub fn probe() -> Self {
        CarDescription {
            model_key: ModelKey::Other,
            mileage: 0.0,
            engine_power: 0.0,
            fuel: Fuel::Other,
            paint_color: PaintColor::Other,
            car_type: CarType::Sedan,
            private_parking_available: false,
            has_gps: false,
            has_air_conditioning: false,
            automatic_car: false,
            has_getaround_connect: false,
            has_speed_regulator: false,
            winter_tires: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionOut {
    pub prediction: f64,
}

#[derive(Debug, Serialize, Clone)]
pub struct HealthOut {
    pub status: &'static str,
    pub version: &'static str,
    pub feature_count: usize,
}
