//! A pure Rust decoder for the HEVC SEI arrays stored with HEIF auxiliary images.
//!
//! Depth maps in HEIF files carry a `depth_representation_info` SEI message
//! (payload type 177) describing how their samples map to depth or disparity.
//! This crate walks the length-prefixed NAL units of such an array, extracts
//! the SEI messages and decodes the ones it knows.
//!
//! ## Examples
//!
//! ```
//! use hevc_sei::{DepthRepresentationType, SeiMessage, decode_aux_sei};
//!
//! # fn test() -> hevc_sei::Result<()> {
//! let data = b"\x00\x00\x00\x11\x00\x00\x00\x0d\x4e\x01\xb1\x09\x35\x1e\x78\xc8\x01\x03\xc5\xd0\x20";
//! let messages = decode_aux_sei(data)?;
//!
//! let SeiMessage::DepthRepresentationInfo(info) = &messages[0] else {
//!     unreachable!()
//! };
//! assert_eq!(info.depth_representation_type, DepthRepresentationType::UniformDisparity);
//! assert_eq!(info.d_min, Some(0.548828125));
//! assert_eq!(info.d_max, Some(2.181640625));
//! # Ok(())
//! # }
//! # test().unwrap();
//! ```
//!
//! ## License
//!
//! This project is licensed under the MIT or Apache-2.0 license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

mod aux_sei;
mod enums;
mod error;
mod nal_unit_header;
mod rbsp;
mod sei;

pub use aux_sei::{
    AuxNalUnit, AuxSeiDecoder, AuxSeiOptions, AuxSeiReport, SeiWarning, decode_aux_sei,
    mux_aux_sei,
};
pub use enums::*;
pub use error::{DecodeError, Result, Unsupported};
pub use nal_unit_header::NALUnitHeader;
pub use rbsp::{nal_to_rbsp, rbsp_to_nal};
pub use sei::*;
