/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Inverse of the squared speed of light, in s².m⁻²
pub const INVERSE_SQUARE_SPEED_OF_LIGHT: f64 = 1.0 / (SPEED_OF_LIGHT_M_S * SPEED_OF_LIGHT_M_S);

/// Inverse of the cubed speed of light, in s³.m⁻³
pub const INVERSE_CUBIC_SPEED_OF_LIGHT: f64 = INVERSE_SQUARE_SPEED_OF_LIGHT / SPEED_OF_LIGHT_M_S;

/// Earth gravitational constant (m^3 s-2)
pub const EARTH_GRAVITATION_MU_M3_S2: f64 = 3.986004418E14;

/// Sun gravitational constant (m^3 s-2)
pub const SUN_GRAVITATION_MU_M3_S2: f64 = 1.32712440018E20;

/// Earth equatorial radius (meters)
pub const EARTH_EQUATORIAL_RADIUS_M: f64 = 6378136.6;

/// Ionospheric refraction constant, in m³.s⁻² (group delay = K * TEC / f²)
pub const IONOSPHERIC_REFRACTION_CONSTANT: f64 = 40.3;

/// One TEC unit, in electrons.m⁻²
pub const TECU: f64 = 1.0E16;
