// This is free and unencumbered software released into the public domain.

use crate::shared::CameraError;
use core::str::FromStr;
use derive_more::Display;

/// Which way a camera lens points relative to the device screen.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
pub enum CameraFacing {
    #[default]
    #[display("front")]
    Front,
    #[display("back")]
    Back,
    #[display("external")]
    External,
}

impl FromStr for CameraFacing {
    type Err = CameraError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(Self::Front),
            "back" | "rear" | "environment" => Ok(Self::Back),
            "external" => Ok(Self::External),
            other => Err(CameraError::invalid_config(format!(
                "unknown camera facing: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraInfo {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub facing: CameraFacing,
    /// Clockwise sensor rotation in degrees (0, 90, 180 or 270).
    pub orientation: u32,
}

impl CameraInfo {
    pub fn new(index: usize, id: impl Into<String>, facing: CameraFacing) -> Self {
        let id = id.into();
        Self {
            index,
            name: id.clone(),
            id,
            facing,
            orientation: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_orientation(mut self, degrees: u32) -> Self {
        self.orientation = degrees % 360;
        self
    }
}

/// Returns the index of the first camera with the given facing.
///
/// There is deliberately no fallback to another facing: a missing camera is
/// reported as [`CameraError::NoFacingCamera`].
pub fn select_camera<'a>(
    cameras: impl IntoIterator<Item = &'a CameraInfo>,
    facing: CameraFacing,
) -> Result<usize, CameraError> {
    cameras
        .into_iter()
        .find(|info| info.facing == facing)
        .map(|info| info.index)
        .ok_or(CameraError::NoFacingCamera(facing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list(facings: &[CameraFacing]) -> Vec<CameraInfo> {
        facings
            .iter()
            .enumerate()
            .map(|(i, f)| CameraInfo::new(i, i.to_string(), *f))
            .collect()
    }

    #[test]
    fn test_selects_first_front_camera() {
        use CameraFacing::*;
        let cameras = list(&[Back, Front, Front]);
        assert_eq!(select_camera(&cameras, Front).unwrap(), 1);
    }

    #[test]
    fn test_rear_only_is_an_error() {
        let cameras = list(&[CameraFacing::Back]);
        assert!(matches!(
            select_camera(&cameras, CameraFacing::Front),
            Err(CameraError::NoFacingCamera(CameraFacing::Front))
        ));
    }

    #[test]
    fn test_empty_list_is_an_error() {
        assert!(select_camera(&Vec::<CameraInfo>::new(), CameraFacing::Front).is_err());
    }

    #[test]
    fn test_parse_facing() {
        assert_eq!("Front".parse::<CameraFacing>().unwrap(), CameraFacing::Front);
        assert_eq!("rear".parse::<CameraFacing>().unwrap(), CameraFacing::Back);
        assert!("sideways".parse::<CameraFacing>().is_err());
    }

    fn facing_strategy() -> impl Strategy<Value = CameraFacing> {
        prop_oneof![
            Just(CameraFacing::Front),
            Just(CameraFacing::Back),
            Just(CameraFacing::External),
        ]
    }

    proptest! {
        #[test]
        fn prop_selection_is_first_matching_index(
            facings in proptest::collection::vec(facing_strategy(), 0..12)
        ) {
            let cameras = list(&facings);
            let expected = facings.iter().position(|f| *f == CameraFacing::Front);
            match (select_camera(&cameras, CameraFacing::Front), expected) {
                (Ok(index), Some(first)) => prop_assert_eq!(index, first),
                (Err(CameraError::NoFacingCamera(_)), None) => {},
                (other, _) => prop_assert!(false, "unexpected selection: {:?}", other),
            }
        }
    }
}
