pub mod registry;

pub use registry::VenueRegistry;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::types::Address;

/// Closed enumeration of routable venues.
///
/// Discriminants are the stable wire encoding callers pass; extend by
/// appending new variants, never by renumbering existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VenueTag {
    Apeswap = 0,
    UniswapV2 = 1,
    UniswapV3 = 2,
    Sushiswap = 3,
    OneInch = 4,
}

impl VenueTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueTag::Apeswap => "Apeswap",
            VenueTag::UniswapV2 => "UniswapV2",
            VenueTag::UniswapV3 => "UniswapV3",
            VenueTag::Sushiswap => "Sushiswap",
            VenueTag::OneInch => "OneInch",
        }
    }

    /// Return all routable venues
    pub fn all() -> Vec<VenueTag> {
        vec![
            VenueTag::Apeswap,
            VenueTag::UniswapV2,
            VenueTag::UniswapV3,
            VenueTag::Sushiswap,
            VenueTag::OneInch,
        ]
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// The external call interface this venue speaks.
    pub fn call_variant(self) -> CallVariant {
        match self {
            VenueTag::Apeswap | VenueTag::UniswapV2 | VenueTag::Sushiswap => CallVariant::V2Style,
            VenueTag::UniswapV3 => CallVariant::V3Style,
            VenueTag::OneInch => CallVariant::AggregatorStyle,
        }
    }
}

impl fmt::Display for VenueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The trust boundary for numeric tags: anything outside the enumeration is
/// rejected here, never silently defaulted to a venue.
impl TryFrom<u8> for VenueTag {
    type Error = RoutingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VenueTag::Apeswap),
            1 => Ok(VenueTag::UniswapV2),
            2 => Ok(VenueTag::UniswapV3),
            3 => Ok(VenueTag::Sushiswap),
            4 => Ok(VenueTag::OneInch),
            tag => Err(RoutingError::UnknownVenue { tag }),
        }
    }
}

/// Call-interface families the dispatcher knows how to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallVariant {
    V2Style,
    V3Style,
    AggregatorStyle,
}

impl CallVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallVariant::V2Style => "V2Style",
            CallVariant::V3Style => "V3Style",
            CallVariant::AggregatorStyle => "AggregatorStyle",
        }
    }
}

impl fmt::Display for CallVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One per venue tag, supplied at startup and immutable thereafter, so a tag
/// always resolves to the same spender address for the process lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct VenueDescriptor {
    pub tag: VenueTag,
    pub spender: Address,
    pub call_variant: CallVariant,
}

impl VenueDescriptor {
    pub fn new(tag: VenueTag, spender: Address) -> Self {
        VenueDescriptor {
            tag,
            spender,
            call_variant: tag.call_variant(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_tags_round_trip() {
        for tag in VenueTag::all() {
            assert_eq!(VenueTag::try_from(tag.as_u8()).unwrap(), tag);
        }
    }

    #[test]
    fn tags_outside_the_enumeration_are_rejected() {
        for raw in [5u8, 9, 255] {
            match VenueTag::try_from(raw) {
                Err(RoutingError::UnknownVenue { tag }) => assert_eq!(tag, raw),
                other => panic!("expected UnknownVenue, got {:?}", other),
            }
        }
    }

    #[test]
    fn wire_encoding_is_stable() {
        assert_eq!(VenueTag::Apeswap.as_u8(), 0);
        assert_eq!(VenueTag::UniswapV2.as_u8(), 1);
        assert_eq!(VenueTag::UniswapV3.as_u8(), 2);
        assert_eq!(VenueTag::Sushiswap.as_u8(), 3);
        assert_eq!(VenueTag::OneInch.as_u8(), 4);
    }

    #[test]
    fn every_tag_has_a_call_variant() {
        assert_eq!(VenueTag::Apeswap.call_variant(), CallVariant::V2Style);
        assert_eq!(VenueTag::UniswapV2.call_variant(), CallVariant::V2Style);
        assert_eq!(VenueTag::Sushiswap.call_variant(), CallVariant::V2Style);
        assert_eq!(VenueTag::UniswapV3.call_variant(), CallVariant::V3Style);
        assert_eq!(VenueTag::OneInch.call_variant(), CallVariant::AggregatorStyle);
    }

    #[test]
    fn descriptor_derives_its_variant_from_the_tag() {
        let descriptor = VenueDescriptor::new(VenueTag::OneInch, Address::ZERO);
        assert_eq!(descriptor.call_variant, CallVariant::AggregatorStyle);
    }
}
