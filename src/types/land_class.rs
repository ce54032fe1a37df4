/// UMD land-cover classification scheme (MCD12Q1 LC_Type2), codes 0-15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandClass {
    Water,                  // 00
    EvergreenNeedleleaf,    // 01
    EvergreenBroadleaf,     // 02
    DeciduousNeedleleaf,    // 03
    DeciduousBroadleaf,     // 04
    MixedForest,            // 05
    ClosedShrubland,        // 06
    OpenShrubland,          // 07
    WoodySavanna,           // 08
    Savanna,                // 09
    Grassland,              // 10
    Wetland,                // 11
    Cropland,               // 12
    Urban,                  // 13
    CroplandMosaic,         // 14
    Barren,                 // 15
}

impl LandClass {
    pub const COUNT: usize = 16;

    /// Get the numeric raster code for this class.
    #[inline] pub fn code(self) -> u8 { self as u8 }

    /// Look up a class by raster code. Codes outside 0-15 are not land cover.
    pub fn from_code(code: u8) -> Option<LandClass> {
        (code < Self::COUNT as u8).then(|| Self::order()[code as usize])
    }

    /// Column name for this class's neighborhood proportion, e.g. "pland_04".
    pub fn column(self) -> String {
        format!("pland_{:02}", self.code())
    }

    pub fn to_str(self) -> &'static str {
        match self {
            LandClass::Water => "water",
            LandClass::EvergreenNeedleleaf => "evergreen_needleleaf",
            LandClass::EvergreenBroadleaf => "evergreen_broadleaf",
            LandClass::DeciduousNeedleleaf => "deciduous_needleleaf",
            LandClass::DeciduousBroadleaf => "deciduous_broadleaf",
            LandClass::MixedForest => "mixed_forest",
            LandClass::ClosedShrubland => "closed_shrubland",
            LandClass::OpenShrubland => "open_shrubland",
            LandClass::WoodySavanna => "woody_savanna",
            LandClass::Savanna => "savanna",
            LandClass::Grassland => "grassland",
            LandClass::Wetland => "wetland",
            LandClass::Cropland => "cropland",
            LandClass::Urban => "urban",
            LandClass::CroplandMosaic => "cropland_mosaic",
            LandClass::Barren => "barren",
        }
    }

    pub fn order() -> [LandClass; 16] {
        [
            LandClass::Water,
            LandClass::EvergreenNeedleleaf,
            LandClass::EvergreenBroadleaf,
            LandClass::DeciduousNeedleleaf,
            LandClass::DeciduousBroadleaf,
            LandClass::MixedForest,
            LandClass::ClosedShrubland,
            LandClass::OpenShrubland,
            LandClass::WoodySavanna,
            LandClass::Savanna,
            LandClass::Grassland,
            LandClass::Wetland,
            LandClass::Cropland,
            LandClass::Urban,
            LandClass::CroplandMosaic,
            LandClass::Barren,
        ]
    }
}
