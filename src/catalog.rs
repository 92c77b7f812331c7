//! Builtin kind declarations for the Carbon Portal metadata ontology
//!
//! Each entry mirrors one class of `cpmeta` (or of PROV-O where the portal
//! reuses it). Attribute names double as query variables and as the keys of
//! the flat attribute dictionaries handed to descriptor generation.

use crate::kind::{Kind, SubpropertyTable};

pub const KINDS: &[Kind] = &[
    // Roots
    Kind::new(
        "Entity",
        None,
        "http://www.w3.org/ns/prov#Entity",
        &[
            ("rdfs:label", "label"),
            ("rdfs:comment", "comment"),
            ("rdfs:seeAlso", "seeAlso"),
        ],
    ),
    Kind::new(
        "Activity",
        None,
        "http://www.w3.org/ns/prov#Activity",
        &[
            ("prov:startedAtTime", "startedAtTime"),
            ("prov:endedAtTime", "endedAtTime"),
            ("prov:wasAssociatedWith", "associatedWith"),
        ],
    ),
    Kind::new(
        "Agent",
        None,
        "http://www.w3.org/ns/prov#Agent",
        &[("cpmeta:hasEmail", "email")],
    ),
    // Agents
    Kind::new(
        "Organization",
        Some("Agent"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Organization",
        &[
            ("cpmeta:hasName", "name"),
            ("cpmeta:hasAtcId", "atcId"),
            ("cpmeta:hasEtcId", "etcId"),
            ("cpmeta:hasOtcId", "otcId"),
        ],
    ),
    Kind::new(
        "Station",
        Some("Organization"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Station",
        &[
            ("cpmeta:hasStationId", "stationId"),
            ("cpmeta:hasSpatialCoverage", "location"),
            ("cpmeta:countryCode", "countryCode"),
            ("cpmeta:hasElevation", "elevation"),
            ("cpmeta:hasStationClass", "stationClass"),
            ("cpmeta:hasLabelingDate", "labelingDate"),
            ("cpmeta:hasResponsibleOrganization", "responsibleOrganization"),
            ("cpmeta:hasTimeZoneOffset", "timeZoneOffset"),
            ("cpmeta:hasFunding", "funding"),
        ],
    ),
    Kind::new(
        "AtmosphericStation",
        Some("Station"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/AS",
        &[
            ("cpmeta:hasWigosId", "wigosId"),
            ("cpmeta:hasGawId", "gawId"),
        ],
    ),
    Kind::new(
        "EcosystemStation",
        Some("Station"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/ES",
        &[
            ("cpmeta:hasEcosystemType", "ecosystemType"),
            ("cpmeta:hasClimateZone", "climateZone"),
            ("cpmeta:hasMeanAnnualTemp", "meanAnnualTemperature"),
            ("cpmeta:hasMeanAnnualPrecip", "meanAnnualPrecipitation"),
            ("cpmeta:hasMeanAnnualRadiation", "meanAnnualRadiation"),
        ],
    ),
    Kind::new(
        "OceanStation",
        Some("Station"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/OS",
        &[("cpmeta:hasPlatformType", "platformType")],
    ),
    Kind::new(
        "ThematicCenter",
        Some("Organization"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/ThematicCenter",
        &[("cpmeta:hasDataTheme", "theme")],
    ),
    Kind::new(
        "CentralFacility",
        Some("Organization"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/CentralFacility",
        &[],
    ),
    Kind::new(
        "Funder",
        Some("Organization"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Funder",
        &[
            ("cpmeta:funderIdentifier", "funderId"),
            ("cpmeta:funderIdentifierType", "funderIdType"),
        ],
    ),
    Kind::new(
        "Person",
        Some("Agent"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Person",
        &[
            ("cpmeta:hasFirstName", "firstName"),
            ("cpmeta:hasLastName", "lastName"),
            ("cpmeta:hasOrcidId", "orcid"),
        ],
    ),
    // Roles and funding
    Kind::new(
        "Role",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Role",
        &[("rdfs:label", "roleName")],
    ),
    Kind::new(
        "Membership",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Membership",
        &[
            ("cpmeta:atOrganization", "organization"),
            ("cpmeta:hasRole", "role"),
            ("cpmeta:hasStartTime", "membershipStart"),
            ("cpmeta:hasEndTime", "membershipEnd"),
            ("cpmeta:hasAttributionWeight", "attributionWeight"),
        ],
    ),
    Kind::new(
        "Funding",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Funding",
        &[
            ("cpmeta:hasFunder", "funder"),
            ("cpmeta:awardNumber", "awardNumber"),
            ("cpmeta:awardTitle", "awardTitle"),
            ("cpmeta:awardURI", "awardUri"),
            ("cpmeta:hasStartDate", "fundingStart"),
            ("cpmeta:hasEndDate", "fundingEnd"),
        ],
    ),
    Kind::new(
        "Instrument",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Instrument",
        &[
            ("cpmeta:hasModel", "model"),
            ("cpmeta:hasSerialNumber", "serialNumber"),
            ("cpmeta:hasVendor", "vendor"),
            ("cpmeta:hasInstrumentOwner", "instrumentOwner"),
            ("cpmeta:hasInstrumentComponent", "instrumentComponent"),
        ],
    ),
    // Geography
    Kind::new(
        "SpatialCoverage",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/SpatialCoverage",
        &[
            ("cpmeta:asGeoJSON", "geoJson"),
            ("rdfs:label", "coverageLabel"),
        ],
    )
    .with_equivalents(&["Position", "LatLonBox"]),
    Kind::new(
        "Position",
        Some("SpatialCoverage"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Position",
        &[
            ("cpmeta:hasLatitude", "latitude"),
            ("cpmeta:hasLongitude", "longitude"),
            ("cpmeta:hasElevation", "altitude"),
        ],
    ),
    Kind::new(
        "LatLonBox",
        Some("SpatialCoverage"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/LatLonBox",
        &[
            ("cpmeta:hasNorthernBound", "northernBound"),
            ("cpmeta:hasSouthernBound", "southernBound"),
            ("cpmeta:hasEasternBound", "easternBound"),
            ("cpmeta:hasWesternBound", "westernBound"),
        ],
    ),
    Kind::new(
        "Site",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Site",
        &[
            ("cpmeta:hasEcosystemType", "siteEcosystemType"),
            ("cpmeta:hasSpatialCoverage", "siteLocation"),
        ],
    ),
    // Objects
    Kind::new(
        "StaticObject",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/StaticObject",
        &[
            ("cpmeta:hasName", "fileName"),
            ("cpmeta:hasSha256sum", "sha256sum"),
            ("cpmeta:hasSizeInBytes", "sizeInBytes"),
            ("cpmeta:wasSubmittedBy", "submission"),
            ("cpmeta:isNextVersionOf", "isNextVersionOf"),
            ("cpmeta:hasDoi", "doi"),
            ("dcterms:license", "license"),
        ],
    ),
    Kind::new(
        "DataObject",
        Some("StaticObject"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DataObject",
        &[
            ("cpmeta:hasObjectSpec", "spec"),
            ("cpmeta:wasAcquiredBy", "acquisition"),
            ("cpmeta:wasProducedBy", "production"),
            ("cpmeta:hasNumberOfRows", "numberOfRows"),
            ("cpmeta:hasActualColumnNames", "actualColumnNames"),
            ("cpmeta:hasSpatialCoverage", "coverage"),
            ("cpmeta:hasTemporalResolution", "temporalResolution"),
            ("cpmeta:hasKeywords", "keywords"),
            ("prov:hadPrimarySource", "hadPrimarySource"),
        ],
    ),
    Kind::new(
        "DocumentObject",
        Some("StaticObject"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DocumentObject",
        &[
            ("dcterms:title", "title"),
            ("dcterms:description", "description"),
            ("dcterms:creator", "creator"),
        ],
    ),
    // Leaf products: the canonical type is the spec's specific dataset type
    Kind::new(
        "StationTimeSeriesObject",
        Some("DataObject"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/stationTimeSeries",
        &[],
    )
    .leaf_product(),
    Kind::new(
        "SpatioTemporalObject",
        Some("DataObject"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/spatioTemporal",
        &[
            ("dcterms:title", "title"),
            ("dcterms:description", "description"),
            ("cpmeta:hasVariableName", "variableName"),
        ],
    )
    .leaf_product(),
    Kind::new(
        "Collection",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Collection",
        &[
            ("dcterms:title", "collectionTitle"),
            ("dcterms:description", "collectionDescription"),
            ("dcterms:hasPart", "hasPart"),
            ("cpmeta:isNextVersionOf", "isNextVersionOf"),
            ("cpmeta:hasDoi", "collectionDoi"),
        ],
    ),
    // Provenance activities
    Kind::new(
        "DataSubmission",
        Some("Activity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DataSubmission",
        &[
            ("prov:startedAtTime", "submissionStart"),
            ("prov:endedAtTime", "submissionEnd"),
            ("prov:wasAssociatedWith", "submitter"),
        ],
    ),
    Kind::new(
        "DataAcquisition",
        Some("Activity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DataAcquisition",
        &[
            ("prov:startedAtTime", "acquisitionStart"),
            ("prov:endedAtTime", "acquisitionEnd"),
            ("prov:wasAssociatedWith", "station"),
            ("cpmeta:wasPerformedWith", "instrument"),
            ("cpmeta:wasPerformedAt", "site"),
            ("cpmeta:hasSamplingHeight", "samplingHeight"),
            ("cpmeta:hasSamplingPoint", "samplingPoint"),
        ],
    ),
    Kind::new(
        "DataProduction",
        Some("Activity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DataProduction",
        &[
            ("cpmeta:wasPerformedBy", "creator"),
            ("cpmeta:wasParticipatedInBy", "contributor"),
            ("cpmeta:wasHostedBy", "host"),
            ("cpmeta:hasEndTime", "productionTime"),
            ("rdfs:comment", "productionComment"),
        ],
    ),
    // Specs and their parts
    Kind::new(
        "DataObjectSpec",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DataObjectSpec",
        &[
            ("rdfs:label", "specLabel"),
            ("rdfs:comment", "specComment"),
            ("cpmeta:hasDataLevel", "dataLevel"),
            ("cpmeta:hasDataTheme", "theme"),
            ("cpmeta:hasFormat", "format"),
            ("cpmeta:hasEncoding", "encoding"),
            ("cpmeta:hasSpecificDatasetType", "datasetType"),
            ("cpmeta:containsDataset", "dataset"),
            ("cpmeta:hasAssociatedProject", "project"),
            ("cpmeta:hasKeywords", "specKeywords"),
        ],
    ),
    Kind::new(
        "SimpleObjectSpec",
        Some("DataObjectSpec"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/SimpleObjectSpec",
        &[],
    ),
    Kind::new(
        "DatasetSpec",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DatasetSpec",
        &[
            ("cpmeta:hasColumn", "column"),
            ("cpmeta:hasVariable", "variable"),
            ("cpmeta:hasTemporalResolution", "datasetTemporalResolution"),
        ],
    ),
    Kind::new(
        "TabularDatasetSpec",
        Some("DatasetSpec"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/TabularDatasetSpec",
        &[],
    ),
    Kind::new(
        "DatasetColumn",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DatasetColumn",
        &[
            ("cpmeta:hasColumnTitle", "columnTitle"),
            ("cpmeta:hasValueType", "valueType"),
            ("cpmeta:hasValueFormat", "valueFormat"),
            ("cpmeta:isOptionalColumn", "optionalColumn"),
            ("cpmeta:isRegexColumn", "regexColumn"),
        ],
    )
    .with_equivalents(&["DatasetVariable"]),
    Kind::new(
        "DatasetVariable",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DatasetVariable",
        &[
            ("cpmeta:hasVariableTitle", "variableTitle"),
            ("cpmeta:hasValueType", "valueType"),
            ("cpmeta:isOptionalVariable", "optionalVariable"),
            ("cpmeta:isRegexVariable", "regexVariable"),
        ],
    ),
    Kind::new(
        "ValueType",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/ValueType",
        &[
            ("rdfs:label", "valueTypeLabel"),
            ("rdfs:comment", "valueTypeComment"),
            ("cpmeta:hasQuantityKind", "quantityKind"),
            ("cpmeta:hasUnit", "unit"),
        ],
    ),
    Kind::new(
        "QuantityKind",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/QuantityKind",
        &[("rdfs:label", "quantityKindLabel")],
    ),
    Kind::new(
        "ObjectFormat",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/ObjectFormat",
        &[("rdfs:label", "formatLabel")],
    ),
    Kind::new(
        "ObjectEncoding",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/ObjectEncoding",
        &[("rdfs:label", "encodingLabel")],
    ),
    Kind::new(
        "DataTheme",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/DataTheme",
        &[
            ("rdfs:label", "themeLabel"),
            ("cpmeta:hasIcon", "icon"),
            ("cpmeta:hasMarkerIcon", "markerIcon"),
        ],
    ),
    Kind::new(
        "Project",
        Some("Entity"),
        "http://meta.icos-cp.eu/ontologies/cpmeta/Project",
        &[
            ("rdfs:label", "projectLabel"),
            ("cpmeta:hasPolicy", "policy"),
            ("cpmeta:hasKeywords", "projectKeywords"),
        ],
    ),
];

/// Composite properties and the finer-grained properties they subsume
pub fn subproperties() -> SubpropertyTable {
    SubpropertyTable::new().declare(
        "cpmeta:hasPolicy",
        &[
            ("cpmeta:hideFromSearchPolicy", "hideFromSearchPolicy"),
            ("cpmeta:skipPidMintingPolicy", "skipPidMintingPolicy"),
            ("cpmeta:skipStoragePolicy", "skipStoragePolicy"),
        ],
    )
}
