//! Outfit suggestions from temperature, rain chance and wind.

use crate::messages::{RandomSource, pick};

pub const FALLBACK_TIP: &str = "Dress comfortably for the day!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutfitBand {
    Rain,
    Snow,
    Wind,
    Freezing,
    Cold,
    Cool,
    Mild,
    Warm,
    Hot,
}

impl OutfitBand {
    /// Pick the band. Precipitation wins over wind, wind over temperature.
    /// Temperatures are in Fahrenheit, wind in whatever unit the caller
    /// displays (the threshold is 20).
    pub fn select(temp_f: f64, rain_chance: f64, wind_speed: f64, is_snowing: bool) -> Self {
        if is_snowing {
            OutfitBand::Snow
        } else if rain_chance > 50.0 {
            OutfitBand::Rain
        } else if wind_speed > 20.0 {
            OutfitBand::Wind
        } else if temp_f < 32.0 {
            OutfitBand::Freezing
        } else if temp_f < 50.0 {
            OutfitBand::Cold
        } else if temp_f < 65.0 {
            OutfitBand::Cool
        } else if temp_f < 75.0 {
            OutfitBand::Mild
        } else if temp_f < 85.0 {
            OutfitBand::Warm
        } else {
            OutfitBand::Hot
        }
    }

    pub fn tips(self) -> &'static [&'static str] {
        match self {
            OutfitBand::Rain => &[
                "Rainy day alert! 🌧️ Don't forget your umbrella and waterproof shoes.",
                "It's a bit wet out there. A raincoat is your best friend today!",
                "Puddle jumping weather! ☔ Rain boots and a trench coat would look cute.",
            ],
            OutfitBand::Snow => &[
                "Snow day! ❄️ Bundle up in your warmest puffer jacket and gloves.",
                "It's winter wonderland! Heavy coat, scarf, and boots are a must.",
            ],
            OutfitBand::Wind => &[
                "Whoosh! It's blustery. A windbreaker will keep you comfy.",
                "Hold onto your hat! 🍃 Secure loose items and wear a wind-resistant layer.",
            ],
            OutfitBand::Freezing => &[
                "Brrr! It's freezing! 🥶 Thermal layers, thick coat, hat, and gloves required.",
                "Ice cold! Stay warm with fleece lining and heavy knits.",
            ],
            OutfitBand::Cold => &[
                "Chilly vibes! 🧣 A warm coat and a cozy scarf are perfect.",
                "Sweater weather max! Layer a turtleneck under a wool coat.",
                "Crisp air today. A beanie and a sturdy jacket will do the trick.",
            ],
            OutfitBand::Cool => &[
                "Fresh and crisp! A denim jacket or light bomber is perfect.",
                "Light sweater weather. 🧶 Cozy but not too heavy.",
                "Perfect layering weather! A hoodie or cardigan is just right.",
            ],
            OutfitBand::Mild => &[
                "Beautifully mild! A long-sleeve tee or light blouse is great.",
                "Just right! You might likely skip the jacket today.",
                "Comfortable weather. Jeans and a tee work perfectly.",
            ],
            OutfitBand::Warm => &[
                "It's getting warm! ☀️ Short sleeves and sunglasses time.",
                "Summer feelings! A sundress or shorts would be lovely.",
                "T-shirt weather! Don't forget sunscreen.",
            ],
            OutfitBand::Hot => &[
                "It's a scorcher! 🥵 Stay cool in breathable fabrics like linen or cotton.",
                "Heat warning! Tank tops, shorts, and plenty of water! 💧",
                "Very hot today. Stay in the shade and wear light colors.",
            ],
        }
    }
}

/// Random tip for the conditions.
pub fn recommend(
    temp_f: f64,
    rain_chance: f64,
    wind_speed: f64,
    is_snowing: bool,
    rng: &mut dyn RandomSource,
) -> &'static str {
    let band = OutfitBand::select(temp_f, rain_chance, wind_speed, is_snowing);
    pick(band.tips(), rng).unwrap_or(FALLBACK_TIP)
}
