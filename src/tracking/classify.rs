use super::types::ParticipantKind;

const CARS: &[&str] = &[
    "audi.a2",
    "audi.etron",
    "audi.tt",
    "bmw.grandtourer",
    "chevrolet.impala",
    "citroen.c3",
    "dodge.charger_2020",
    "dodge.charger_police",
    "dodge.charger_police_2020",
    "ford.crown",
    "ford.mustang",
    "jeep.wrangler_rubicon",
    "lincoln.mkz_2017",
    "lincoln.mkz_2020",
    "mercedes.coupe",
    "mercedes.coupe_2020",
    "mercedes.sprinter",
    "micro.microlino",
    "mini.cooper_s",
    "mini.cooper_s_2021",
    "nissan.micra",
    "nissan.patrol",
    "nissan.patrol_2021",
    "seat.leon",
    "tesla.cybertruck",
    "tesla.model3",
    "toyota.prius",
    "volkswagen.t2",
    "volkswagen.t2_2021",
];

const BIKES: &[&str] = &["bh.crossbike", "diamondback.century", "gazelle.omafiets"];

const MOTORCYCLES: &[&str] = &[
    "harley-davidson.low_rider",
    "kawasaki.ninja",
    "vespa.zx125",
    "yamaha.yzf",
];

const TRUCKS: &[&str] = &[
    "carlamotors.carlacola",
    "carlamotors.firetruck",
    "ford.ambulance",
];

/// Checked in this order; the first model name contained in the blueprint wins.
const CATALOGUE: &[(ParticipantKind, &[&str])] = &[
    (ParticipantKind::Car, CARS),
    (ParticipantKind::Bike, BIKES),
    (ParticipantKind::Motorcycle, MOTORCYCLES),
    (ParticipantKind::Truck, TRUCKS),
];

/// Whether a blueprint id names a road user worth tracking at all.
pub fn is_road_user(blueprint: &str) -> bool {
    blueprint.contains("vehicle") || blueprint.contains("pedestrian") || blueprint.contains("walker")
}

/// Maps a blueprint id such as `vehicle.tesla.model3` to a participant kind.
/// Anything not found in the vehicle catalogue is treated as a pedestrian.
pub fn classify(blueprint: &str) -> ParticipantKind {
    CATALOGUE
        .iter()
        .find(|(_, models)| models.iter().any(|m| blueprint.contains(m)))
        .map(|(kind, _)| *kind)
        .unwrap_or(ParticipantKind::Pedestrian)
}
