//! Body catalog: J2000 elements and physical data.
//!
//! Planet elements from Standish (1992) / JPL approximate planetary positions,
//! converted from mean longitude and longitude of perihelion to argument of
//! periapsis and mean anomaly. Distances in km, periods in days, angles in
//! degrees. Moon orbits are authored in scene units so the systems stay
//! legible next to their parents.

use serde::{Deserialize, Serialize};

use crate::components::{BodyKind, LengthUnit, OrbitalElements};
use crate::orbit::anomaly::normalize_degrees;
use crate::orbit::epoch::J2000_JD;

/// Kilometres per astronomical unit.
pub const AU_KM: f64 = 149_597_870.7;
/// Scene units per kilometre for moon orbits.
const MOON_ORBIT_SCALE: f64 = 0.125;

/// One body in a scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyConfig {
    pub name: String,
    pub kind: BodyKind,
    /// Name of the body this one orbits. Only moons have a parent entity;
    /// planets orbit the origin.
    #[serde(default)]
    pub parent: Option<String>,
    pub radius_km: f64,
    #[serde(default)]
    pub axial_tilt_deg: f64,
    /// Negative for retrograde rotation.
    #[serde(default)]
    pub rotation_period_hours: f64,
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default = "default_bounding_box_scale")]
    pub bounding_box_scale: f64,
    #[serde(default)]
    pub orbit: Option<OrbitConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitConfig {
    #[serde(flatten)]
    pub elements: OrbitalElements,
    pub period_days: f64,
    #[serde(default = "default_epoch")]
    pub epoch_jd: f64,
    #[serde(default)]
    pub unit: LengthUnit,
}

fn default_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_bounding_box_scale() -> f64 {
    1.0
}

fn default_epoch() -> f64 {
    J2000_JD
}

/// Parse a catalog (a JSON array of bodies).
pub fn catalog_from_json(json: &str) -> Result<Vec<BodyConfig>, serde_json::Error> {
    serde_json::from_str(json)
}

struct Physical {
    radius_km: f64,
    tilt: f64,
    rotation_hours: f64,
    color: [f32; 3],
    textured: bool,
}

fn body(name: &str, kind: BodyKind, p: Physical) -> BodyConfig {
    BodyConfig {
        name: name.to_string(),
        kind,
        parent: None,
        radius_km: p.radius_km,
        axial_tilt_deg: p.tilt,
        rotation_period_hours: p.rotation_hours,
        texture: p.textured.then(|| name.to_lowercase()),
        color: p.color,
        bounding_box_scale: 1.0,
        orbit: None,
    }
}

/// Planet from Standish-style elements: `l` mean longitude, `varpi`
/// longitude of perihelion, `node` longitude of the ascending node.
#[allow(clippy::too_many_arguments)]
fn planet(
    name: &str,
    a_km: f64,
    e: f64,
    i: f64,
    l: f64,
    varpi: f64,
    node: f64,
    period_days: f64,
    p: Physical,
) -> BodyConfig {
    let mut b = body(name, BodyKind::Planet, p);
    b.orbit = Some(OrbitConfig {
        elements: OrbitalElements {
            semi_major_axis: a_km,
            eccentricity: e,
            inclination: i,
            longitude_of_ascending_node: node,
            argument_of_periapsis: normalize_degrees(varpi - node),
            mean_anomaly: normalize_degrees(l - varpi),
        },
        period_days,
        epoch_jd: J2000_JD,
        unit: LengthUnit::Kilometers,
    });
    b
}

#[allow(clippy::too_many_arguments)]
fn moon(
    name: &str,
    parent: &str,
    a_scene: f64,
    e: f64,
    i: f64,
    node: f64,
    peri: f64,
    m0: f64,
    period_days: f64,
    p: Physical,
) -> BodyConfig {
    let mut b = body(name, BodyKind::Moon, p);
    b.parent = Some(parent.to_string());
    b.orbit = Some(OrbitConfig {
        elements: OrbitalElements {
            semi_major_axis: a_scene,
            eccentricity: e,
            inclination: i,
            longitude_of_ascending_node: node,
            argument_of_periapsis: peri,
            mean_anomaly: m0,
        },
        period_days,
        epoch_jd: J2000_JD,
        unit: LengthUnit::Scene,
    });
    b
}

fn phys(radius_km: f64, tilt: f64, rotation_hours: f64, color: [f32; 3], textured: bool) -> Physical {
    Physical { radius_km, tilt, rotation_hours, color, textured }
}

/// Sun, eight planets, Pluto and the major moons.
pub fn solar_system() -> Vec<BodyConfig> {
    let mut bodies = vec![
        body("Sun", BodyKind::Star, phys(695_700.0, 7.25, 609.12, [1.0, 0.9, 0.5], true)),
        planet("Mercury", 0.387_099_27 * AU_KM, 0.205_635_93, 7.004_979_02,
            252.250_323_50, 77.457_796_28, 48.330_765_93, 87.969,
            phys(2_439.7, 0.03, 1_407.6, [0.60, 0.58, 0.55], true)),
        planet("Venus", 0.723_335_66 * AU_KM, 0.006_776_72, 3.394_676_05,
            181.979_099_50, 131.602_467_18, 76.679_842_55, 224.701,
            phys(6_051.8, 177.4, -5_832.5, [0.95, 0.85, 0.60], true)),
        planet("Earth", 149_600_000.0, 0.016_710_22, 0.0,
            100.464_571_66, 102.937_681_93, 0.0, 365.256,
            phys(6_371.0, 23.44, 23.934, [0.30, 0.50, 0.90], true)),
        planet("Mars", 1.523_710_34 * AU_KM, 0.093_394_10, 1.849_691_42,
            -4.553_432_05, -23.943_629_59, 49.559_538_91, 686.980,
            phys(3_389.5, 25.19, 24.623, [0.85, 0.40, 0.20], true)),
        planet("Jupiter", 5.202_887_00 * AU_KM, 0.048_386_24, 1.304_396_95,
            34.396_440_51, 14.728_479_83, 100.473_909_09, 4_332.59,
            phys(69_911.0, 3.13, 9.925, [0.85, 0.75, 0.60], true)),
        planet("Saturn", 9.536_675_94 * AU_KM, 0.053_861_79, 2.485_991_87,
            49.954_244_23, 92.598_878_31, 113.662_424_48, 10_759.22,
            phys(58_232.0, 26.73, 10.656, [0.90, 0.80, 0.55], true)),
        planet("Uranus", 19.189_164_64 * AU_KM, 0.047_257_44, 0.772_637_83,
            313.238_104_51, 170.954_276_30, 74.016_925_03, 30_688.5,
            phys(25_362.0, 97.77, -17.24, [0.60, 0.85, 0.90], true)),
        planet("Neptune", 30.069_922_76 * AU_KM, 0.008_590_48, 1.770_043_47,
            -55.120_029_69, 44.964_762_27, 131.784_225_74, 60_182.0,
            phys(24_622.0, 28.32, 16.11, [0.30, 0.45, 0.90], true)),
        planet("Pluto", 39.482_116_75 * AU_KM, 0.248_827_30, 17.140_012_06,
            238.929_038_33, 224.068_916_29, 110.303_936_84, 90_560.0,
            phys(1_188.3, 122.53, -153.29, [0.80, 0.70, 0.60], true)),
    ];

    let k = MOON_ORBIT_SCALE;
    bodies.extend([
        moon("Moon", "Earth", 48_050.0, 0.0549, 5.145, 125.08, 318.15, 135.27, 27.3217,
            phys(1_737.4, 6.68, 655.72, [0.70, 0.70, 0.70], true)),
        moon("Phobos", "Mars", 9_376.0 * k, 0.0151, 1.08, 16.9, 150.1, 91.0, 0.318_91,
            phys(11.27, 0.0, 7.65, [0.50, 0.45, 0.40], false)),
        moon("Deimos", "Mars", 23_463.2 * k, 0.000_33, 1.79, 47.2, 260.7, 325.3, 1.262_44,
            phys(6.2, 0.0, 30.3, [0.55, 0.50, 0.45], false)),
        moon("Io", "Jupiter", 421_700.0 * k, 0.0041, 0.05, 43.98, 84.13, 342.0, 1.769_138,
            phys(1_821.6, 0.0, 42.46, [0.90, 0.80, 0.30], false)),
        moon("Europa", "Jupiter", 671_034.0 * k, 0.009, 0.47, 219.1, 88.97, 171.0, 3.551_181,
            phys(1_560.8, 0.1, 85.23, [0.80, 0.70, 0.50], false)),
        moon("Ganymede", "Jupiter", 1_070_412.0 * k, 0.0013, 0.2, 63.55, 192.4, 317.5, 7.154_553,
            phys(2_634.1, 0.33, 171.7, [0.60, 0.55, 0.50], false)),
        moon("Callisto", "Jupiter", 1_882_709.0 * k, 0.0074, 0.28, 298.8, 52.64, 181.4, 16.689_018,
            phys(2_410.3, 0.0, 400.5, [0.35, 0.30, 0.28], false)),
        moon("Titan", "Saturn", 1_221_870.0 * k, 0.0288, 0.35, 78.6, 78.3, 11.7, 15.945,
            phys(2_574.7, 0.3, 382.7, [0.85, 0.70, 0.30], false)),
        moon("Triton", "Neptune", 354_759.0 * k, 0.000_016, 156.885, 177.6, 344.0, 264.8, 5.876_854,
            phys(1_353.4, 0.0, -141.0, [0.60, 0.70, 0.80], false)),
        moon("Charon", "Pluto", 19_591.0 * k, 0.0002, 0.08, 223.0, 146.1, 131.1, 6.387_2,
            phys(606.0, 0.0, 153.29, [0.55, 0.55, 0.55], false)),
    ]);

    if let Some(saturn) = bodies.iter_mut().find(|b| b.name == "Saturn") {
        // Rings.
        saturn.bounding_box_scale = 2.3;
    }
    bodies
}
