//! Built-in property catalog for Spring-engine unit, feature, and weapon
//! definitions.
//!
//! Columns: identifier, display name, value shape, comparison rule,
//! balance relevance. `None` in the last column means "not declared", which
//! counts as relevant.

use crate::property::{PropertyDef, ValueShape};
use crate::rule::BuffRule;

use crate::rule::BuffRule::{HigherIsBetter as Hi, LowerIsBetter as Lo, TrueIsBetter as T};
use crate::property::ValueShape::{
    AnyMap as AM, Boolean as B, Number as N, NumberArray as NA, String as S, StringArray as SA,
    UnitDefObject as UO,
};

type Row = (
    &'static str,
    Option<&'static str>,
    Option<ValueShape>,
    Option<BuffRule>,
    Option<bool>,
);

pub(crate) const CATALOG: &[Row] = &[
    // https://springrts.com/wiki/Gamedev:UnitDefs
    ("acceleration", Some("Acceleration"), Some(N), Some(Hi), Some(true)),
    ("autoheal", Some("AutoHeal"), Some(N), Some(Hi), Some(true)),
    ("brakerate", Some("Brake Rate"), Some(N), Some(Hi), Some(true)),
    ("builder", Some("Builder"), Some(B), Some(T), Some(true)),
    ("buildcostenergy", Some("Energy Build Cost"), Some(N), Some(Lo), Some(true)),
    ("buildcostmetal", Some("Metal Build Cost"), Some(N), Some(Lo), Some(true)),
    ("builddistance", Some("Build Distance"), Some(N), Some(Hi), Some(true)),
    ("buildpic", Some("Build Pic"), Some(S), None, Some(false)),
    ("buildtime", Some("Build Time"), Some(N), Some(Lo), Some(true)),
    ("cancapture", Some("Can Capture"), Some(B), Some(T), Some(true)),
    ("cancloak", Some("Can Cloak"), Some(B), Some(T), Some(true)),
    ("canmanualfire", Some("Can Fire Manually"), Some(B), Some(T), Some(true)),
    ("canmove", Some("Can Move"), Some(B), Some(T), Some(true)),
    ("capturespeed", Some("Capture Speed"), Some(N), Some(Hi), Some(true)),
    ("category", Some("Unit Categories"), Some(SA), None, Some(true)),
    ("cloakcost", Some("Cloak Cost"), Some(N), Some(Lo), Some(true)),
    ("cloakcostmoving", Some("Moving Cloak Cost"), Some(N), Some(Lo), Some(true)),
    ("collisionvolumeoffsets", Some("Collision Volume Offsets"), Some(NA), None, Some(false)),
    ("collisionvolumescales", Some("Collision Volume Scales"), Some(NA), None, Some(false)),
    ("collisionvolumetype", Some("Collision Volume Type"), Some(S), None, Some(false)),
    ("corpse", Some("Corpse Type"), Some(S), None, Some(false)),
    ("description", Some("Description"), Some(S), None, Some(false)),
    ("energymake", Some("Energy Generation"), Some(N), Some(Hi), Some(true)),
    ("energystorage", Some("Energy Storage"), Some(N), Some(Hi), Some(true)),
    ("explodeas", Some("Explosion Type"), Some(S), None, None),
    ("footprintx", Some("Footprint X"), Some(N), None, Some(false)),
    ("footprintz", Some("Footprint Z"), Some(N), None, Some(false)),
    ("hidedamage", Some("Hide Damage"), Some(B), None, Some(true)),
    ("holdsteady", Some("Hold Steady"), Some(B), None, Some(true)),
    ("icontype", Some("Icon Type"), Some(S), None, Some(false)),
    ("idleautoheal", Some("Idle AutoHeal"), Some(N), Some(Hi), Some(true)),
    ("idletime", Some("Idle Time"), Some(N), None, Some(true)),
    ("losemitheight", Some("LOS Height"), Some(N), Some(Hi), Some(true)),
    ("mass", Some("Mass"), Some(N), None, Some(true)),
    ("maxdamage", Some("Base HP"), Some(N), Some(Hi), Some(true)),
    ("maxslope", Some("Max Slope"), Some(N), Some(Hi), Some(true)),
    ("maxvelocity", Some("Max Velocity"), Some(N), Some(Hi), Some(true)),
    ("maxwaterdepth", Some("Max Water Depth"), Some(N), Some(Hi), Some(true)),
    ("metalmake", Some("Metal Generation"), Some(N), Some(Hi), Some(true)),
    ("metalstorage", Some("Metal Storage"), Some(N), Some(Hi), Some(true)),
    ("mincloakdistance", Some("Min Cloak Distance"), Some(N), Some(Lo), Some(true)),
    ("movementclass", Some("Movement Class"), Some(S), None, Some(true)),
    ("name", Some("Name"), Some(S), None, Some(false)),
    ("nochasecategory", Some("No Chase Category"), Some(S), None, None),
    ("objectname", Some("Object Name"), Some(S), None, Some(false)),
    ("pushresistant", Some("Push Resistant"), Some(B), None, Some(true)),
    ("radardistance", Some("Radar Distance"), Some(N), Some(Hi), Some(true)),
    ("radaremitheight", Some("Radar LOS Height"), Some(N), Some(Hi), Some(true)),
    ("reclaimable", Some("Reclaimable"), Some(B), None, Some(true)),
    ("resurrectable", Some("Resurrectable"), Some(B), None, Some(true)),
    ("releaseheld", Some("Safely Drops Units"), Some(B), Some(T), Some(true)),
    ("script", Some("Script"), Some(S), None, Some(false)),
    ("seismicsignature", Some("Seismic Signature"), Some(N), None, Some(true)),
    ("selfdestructas", Some("Self D Type"), Some(S), None, None),
    ("selfdestructcountdown", Some("Self D Time"), Some(N), Some(Lo), Some(true)),
    ("showplayername", Some("Show Player Name"), Some(S), None, None),
    ("sightdistance", Some("Sight Distance"), Some(N), Some(Hi), Some(true)),
    ("stealth", Some("Stealth"), Some(B), Some(T), Some(true)),
    ("sonardistance", Some("Sonar Distance"), Some(N), Some(Hi), Some(true)),
    ("terraformspeed", Some("Terraform Speed"), Some(N), Some(Hi), Some(true)),
    ("trackoffset", Some("Track Offset"), Some(N), None, Some(false)),
    ("trackstrength", Some("Track Strength"), Some(N), None, Some(false)),
    ("tracktype", Some("Track Type"), Some(S), None, Some(false)),
    ("trackwidth", Some("Track Width"), Some(N), None, Some(false)),
    ("turninplaceanglelimit", Some("Turn in Place Angle Limit"), Some(N), None, Some(true)),
    ("turninplacespeedlimit", Some("Turn in Place Speed Limit"), Some(N), None, Some(true)),
    ("turnrate", Some("Turn Rate"), Some(N), Some(Hi), Some(true)),
    ("upright", Some("Upright"), Some(B), None, Some(true)),
    ("workertime", Some("Build Power"), Some(N), Some(Hi), Some(true)),
    ("buildoptions", Some("Build Options"), Some(SA), None, Some(true)),
    ("buildinggrounddecaltype", Some("Building Ground Decal Type"), Some(S), None, Some(false)),
    ("buildinggrounddecalsizex", Some("Building Ground Decal Size X"), Some(S), None, Some(false)),
    ("buildinggrounddecalsizey", Some("Building Ground Decal Size Y"), Some(S), None, Some(false)),
    ("yardmap", Some("Yardmap"), Some(S), None, Some(false)),

    // Custom params
    ("customparams", Some("Custom Params"), Some(AM), None, None),
    ("paralyzemultiplier", Some("Paralyze Multiplier"), Some(N), Some(Lo), Some(true)),
    ("expl_light_color", Some("Explosion Light Color"), Some(S), None, Some(false)),
    ("expl_light_mult", Some("Explosion Light Multiplier"), Some(N), None, Some(false)),
    ("expl_light_radius_mult", Some("Explosion Light Radius Multiplier"), Some(N), None, Some(false)),
    ("expl_light_life_mult", Some("Explosion Light Life Multiplier"), Some(N), None, Some(false)),
    ("light_color", Some("Light Color"), Some(S), None, Some(false)),
    ("light_skip", Some("Light Skip"), Some(B), None, Some(false)),
    ("normaltex", Some("Normal Texture"), Some(S), None, Some(false)),
    ("model_author", Some("Model Author"), Some(S), None, Some(false)),
    ("subfolder", Some("Subfolder"), Some(S), None, Some(false)),
    ("longdescription", Some("Long Description"), Some(S), None, Some(false)),
    ("area_mex_def", Some("Area Mex Def"), Some(S), None, Some(false)),
    ("model", Some("Model"), Some(S), None, Some(false)),
    ("smoketrail", Some("Smoke Trail"), Some(B), None, Some(false)),
    ("light_mult", Some("Light Mult"), Some(N), None, Some(false)),
    ("light_life_mult", Some("Light Life Mult"), Some(N), None, Some(false)),
    ("light_radius_mult", Some("Light Radius Mult"), Some(N), None, Some(false)),
    ("expl_light_heat_radius_mult", None, None, None, Some(false)),
    ("expl_light_heat_strength_mult", None, None, None, Some(false)),
    ("expl_light_heat_radius", None, None, None, Some(false)),
    ("expl_light_radius", None, None, None, Some(false)),
    ("texture1", None, None, None, Some(false)),
    ("texture2", None, None, None, Some(false)),
    ("texture3", None, None, None, Some(false)),
    ("texture4", None, None, None, Some(false)),

    // https://springrts.com/wiki/Gamedev:FeatureDefs
    ("featuredefs", Some("Features"), Some(UO), None, Some(true)),
    ("blocking", Some("Blocking"), Some(B), None, Some(true)),
    ("damage", Some("Damage"), Some(N), Some(Hi), Some(true)),
    ("energy", Some("Energy"), Some(N), None, Some(true)),
    ("featuredead", Some("Dead Feature Type"), Some(S), None, None),
    ("featurereclamate", Some("Feature Reclamate"), Some(S), None, Some(false)),
    ("height", Some("Height"), Some(N), None, Some(true)),
    ("hitdensity", Some("Hit Density"), Some(N), None, Some(true)),
    ("metal", Some("Metal"), Some(N), None, Some(true)),
    ("object", Some("Object"), Some(S), None, Some(false)),
    ("seqnamereclamate", Some("Seqname Reclamate"), Some(S), None, Some(false)),
    ("world", Some("World"), Some(S), None, Some(false)),

    // https://springrts.com/wiki/Gamedev:WeaponDefs
    ("weapondefs", Some("Weapons"), Some(UO), None, None),
    ("areaofeffect", Some("Area of Effect"), Some(N), Some(Hi), Some(true)),
    ("avoidfeature", Some("Avoid Features"), Some(B), None, Some(true)),
    ("avoidfriendly", Some("Avoid Friendlies"), Some(B), None, Some(true)),
    ("avoidground", Some("Avoid Ground"), Some(B), None, Some(true)),
    ("beamtime", Some("Beam Time"), Some(N), Some(Hi), Some(true)),
    ("bouncerebound", Some("Bounce Rebound"), Some(N), None, Some(true)),
    ("burnblow", Some("Self Explode"), Some(B), Some(T), Some(true)),
    ("cegtag", Some("CEG Tag"), Some(S), None, Some(false)),
    ("commandfire", Some("Command Fire"), Some(B), None, Some(true)),
    ("corethickness", Some("Core Thickness"), Some(N), None, Some(false)),
    ("craterareaofeffect", Some("Crater Area of Effect"), Some(N), None, Some(true)),
    ("craterboost", Some("Crater Boost"), Some(N), None, Some(false)),
    ("cratermult", Some("Crater Mult"), Some(N), None, Some(false)),
    ("cylindertargeting", Some("Cylinder Targeting"), Some(N), None, Some(false)),
    ("edgeeffectiveness", Some("Edge Effectiveness"), Some(N), None, Some(true)),
    ("energypershot", Some("Energy Per Shot"), Some(N), Some(Lo), Some(true)),
    ("explosiongenerator", Some("Explosion Generator"), Some(S), None, Some(false)),
    ("firestarter", Some("Fire Starter"), Some(N), Some(T), Some(true)),
    ("firesubmersed", Some("Fire Submersed"), Some(B), None, Some(true)),
    ("flighttime", Some("Flight Time"), Some(N), None, Some(true)),
    ("groundbounce", Some("Ground Bounce"), Some(B), Some(T), Some(true)),
    ("impactonly", Some("Impact Only"), Some(N), None, Some(true)),
    ("impulseboost", Some("Impulse Boost"), Some(N), None, Some(true)),
    ("impulsefactor", Some("Impulse Factor"), Some(N), None, Some(true)),
    ("laserflaresize", Some("Laser Flare Size"), Some(N), None, Some(false)),
    ("noexplode", Some("Explode on Impact"), Some(B), None, Some(true)),
    ("noselfdamage", Some("No Self Damage"), Some(B), Some(T), Some(true)),
    ("range", Some("Range"), Some(N), Some(Hi), Some(true)),
    ("reloadtime", Some("Reload Time"), Some(N), Some(Lo), Some(true)),
    ("rgbcolor", Some("RGB Color"), Some(NA), None, Some(false)),
    ("sfxtypes", Some("Sound Types"), Some(UO), None, Some(false)),
    ("size", Some("Size"), Some(N), None, Some(false)),
    ("smokeperiod", Some("Smoke Period"), Some(N), None, Some(false)),
    ("smoketime", Some("Smoke Time"), Some(N), None, Some(false)),
    ("smokesize", Some("Smoke Size"), Some(N), None, Some(false)),
    ("smokecolor", Some("Smoke Color"), Some(N), None, Some(false)),
    ("castshadow", Some("Cast Shadow"), Some(N), None, Some(false)),
    ("smoketrailcastshadow", Some("Smoke Trail Cast Shadow"), Some(N), None, Some(false)),
    ("sounds", Some("Sounds"), Some(UO), None, Some(false)),
    ("soundhit", Some("Sound Hit"), Some(S), None, Some(false)),
    ("soundhitdry", Some("Sound Hit Dry"), Some(S), None, Some(false)),
    ("soundhitwet", Some("Sound Hit Wet"), Some(S), None, Some(false)),
    ("soundstartvolume", Some("Sound Start Volume"), Some(S), None, Some(false)),
    ("soundhitvolume", Some("Sound Hit Volume"), Some(S), None, Some(false)),
    ("soundstart", Some("Sound Start"), Some(S), None, Some(false)),
    ("soundtrigger", Some("Sound Trigger"), Some(B), None, Some(false)),
    ("sprayangle", Some("Spray Angle"), Some(N), None, None),
    ("targetmoveerror", Some("Target Move Error"), Some(N), Some(Lo), Some(true)),
    ("thickness", Some("Thickness"), Some(N), None, None),
    ("tolerance", Some("Tolerance"), Some(N), None, Some(true)),
    ("turret", Some("Turret"), Some(B), None, Some(true)),
    ("waterweapon", Some("Water Weapon"), Some(B), Some(T), Some(true)),
    ("weapontimer", Some("Weapon Timer"), Some(N), None, Some(true)),
    ("weapontype", Some("Weapon Type"), Some(S), None, None),
    ("weaponvelocity", Some("Weapon Velocity"), Some(N), Some(Hi), Some(true)),
    ("alpha", Some("Alpha"), Some(N), None, Some(false)),
    ("energyuse", Some("Energy Use"), Some(N), None, None),
    ("force", Some("Force"), Some(N), None, None),
    ("intercepttype", Some("Intercept Type"), Some(N), None, None),
    ("power", Some("Power"), Some(N), Some(Hi), Some(true)),
    ("powerregen", Some("Power Regen"), Some(N), Some(Hi), Some(true)),
    ("powerregenenergy", Some("Power Regen Energy"), Some(N), Some(Lo), Some(true)),
    ("radius", Some("Radius"), Some(N), Some(Hi), Some(true)),
    ("rechargedelay", Some("Recharge Delay"), Some(N), Some(Lo), Some(true)),
    ("repulser", Some("Repulser"), Some(N), None, None),
    ("smart", Some("Smart"), Some(B), None, None),
    ("startingpower", Some("Starting Power"), Some(N), Some(Hi), Some(true)),
    ("visible", Some("Visible"), Some(B), None, None),
    ("visiblehitframes", Some("Visible Hit Frames"), Some(N), None, None),
    ("badcolor", Some("Bad Color"), Some(NA), None, Some(false)),
    ("goodcolor", Some("Good Color"), Some(NA), None, Some(false)),
    ("colormap", None, None, None, Some(false)),
    ("sizedecay", None, None, None, Some(false)),
    ("sizegrowth", None, None, None, Some(false)),
    ("alphadecay", None, None, None, Some(false)),
    ("separation", None, None, None, Some(false)),
    ("nogap", None, None, None, Some(false)),
    ("stages", None, None, None, Some(false)),
    ("flamegfxtime", None, None, None, Some(false)),
    ("hardstop", None, None, None, Some(false)),
    ("falloffrate", None, None, None, Some(false)),
    ("loddistance", None, None, None, Some(false)),
    ("rgbcolor2", None, None, None, Some(false)),
    ("def", None, None, None, Some(false)),
    ("slaveto", None, None, None, Some(false)),];

/// Iterate the catalog as `(identifier, definition)` pairs.
pub(crate) fn entries() -> impl Iterator<Item = (&'static str, PropertyDef)> {
    CATALOG
        .iter()
        .map(|&(id, friendly_name, shape, buff_rule, balance_change)| {
            (
                id,
                PropertyDef {
                    friendly_name: friendly_name.map(str::to_string),
                    shape,
                    buff_rule,
                    balance_change,
                },
            )
        })
}
