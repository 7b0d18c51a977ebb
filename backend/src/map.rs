use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HospitalMarker {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

pub const HOSPITALS: [HospitalMarker; 5] = [
    HospitalMarker {
        name: "RSCM Jakarta",
        lat: -6.2088,
        lon: 106.8456,
    },
    HospitalMarker {
        name: "RSUP Dr. Sardjito Yogyakarta",
        lat: -7.7829,
        lon: 110.3671,
    },
    HospitalMarker {
        name: "RSUP Dr. Hasan Sadikin Bandung",
        lat: -6.9175,
        lon: 107.6191,
    },
    HospitalMarker {
        name: "RSUP Sanglah Denpasar",
        lat: -8.6731,
        lon: 115.2126,
    },
    HospitalMarker {
        name: "RSUP Dr. Kariadi Semarang",
        lat: -6.9826,
        lon: 110.4091,
    },
];

pub const MAP_CENTER: (f64, f64) = (-6.2, 106.816666);
pub const MAP_ZOOM: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub color: &'static str,
    pub icon: &'static str,
}

pub const HOSPITAL_STYLE: MarkerStyle = MarkerStyle {
    color: "red",
    icon: "plus-sign",
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub popup: &'static str,
    pub location: [f64; 2],
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
    pub markers: Vec<Marker>,
}

/// The hospital map shown under the form. Takes no input and always yields
/// the same view.
pub fn hospital_map() -> MapView {
    MapView {
        center: [MAP_CENTER.0, MAP_CENTER.1],
        zoom: MAP_ZOOM,
        width: 700,
        height: 500,
        markers: HOSPITALS
            .iter()
            .map(|hospital| Marker {
                popup: hospital.name,
                location: [hospital.lat, hospital.lon],
                style: HOSPITAL_STYLE,
            })
            .collect(),
    }
}
