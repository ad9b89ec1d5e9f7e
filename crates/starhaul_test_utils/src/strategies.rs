//! Proptest strategies for simulation types.

use proptest::prelude::*;

use starhaul_core::prelude::*;
use starhaul_core::station::STATION_RESOURCE_MAX;

/// Any stock level a station can legally hold (plus a little overshoot,
/// since debug tooling may write out-of-range values that the next tick
/// must re-clamp).
pub fn stock_level() -> impl Strategy<Value = f32> {
    -50.0..STATION_RESOURCE_MAX + 50.0
}

/// Any resource kind.
pub fn resource() -> impl Strategy<Value = Resource> {
    prop_oneof![Just(Resource::Materials), Just(Resource::Food)]
}

/// Any station kind.
pub fn station_kind() -> impl Strategy<Value = StationKind> {
    prop_oneof![
        Just(StationKind::Mining),
        Just(StationKind::Agricultural),
        Just(StationKind::Pirate),
        Just(StationKind::Police),
    ]
}

/// A station with arbitrary (possibly out-of-range) stocks and credits.
pub fn station() -> impl Strategy<Value = Station> {
    (
        station_kind(),
        stock_level(),
        stock_level(),
        0_i64..20_000,
    )
        .prop_map(|(kind, materials, food, credits)| {
            Station::new(1, kind, Vec2::ZERO, materials, food, credits)
        })
}
