use clap::ValueEnum;
use harvest_pipeline::PacingKind;
use harvest_protocol::NluEndpoint;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum EndpointFlag {
    Topics,
    Entities,
    Categories,
}

impl EndpointFlag {
    pub(crate) const fn as_domain(self) -> NluEndpoint {
        match self {
            EndpointFlag::Topics => NluEndpoint::Topics,
            EndpointFlag::Entities => NluEndpoint::Entities,
            EndpointFlag::Categories => NluEndpoint::Categories,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Csv,
    Collectconcepts,
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum PresetFlag {
    Fruits,
    Scientists,
}

impl PresetFlag {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            PresetFlag::Fruits => "fruits",
            PresetFlag::Scientists => "scientists",
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum PacingFlag {
    Fixed,
    Interval,
    Off,
}

impl PacingFlag {
    pub(crate) const fn as_domain(self) -> PacingKind {
        match self {
            PacingFlag::Fixed => PacingKind::Fixed,
            PacingFlag::Interval => PacingKind::Interval,
            PacingFlag::Off => PacingKind::Off,
        }
    }
}
