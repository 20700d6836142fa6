// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: hashctl
// File: catalog.rs
// Author: hashctl maintainers

//! Process-wide algorithm catalog.
//!
//! The catalog is built once, on first use, and shared behind an `Arc`.
//! Nothing mutates it afterwards; callers only ever look descriptors up.

use crate::hctl::hash::{Accumulator, Blake3, Crc32};
use digest::consts::{U32, U48};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use strum::{EnumIter, IntoEnumIterator};

/// Constructor for a fresh streaming accumulator.
pub type AccumulatorFactory = fn() -> Box<dyn Accumulator>;

#[derive(
	Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, EnumIter,
)]
pub enum Category {
	Checksum,
	FastHash,
	PasswordHash,
}

impl Category {
	pub fn label(self) -> &'static str {
		match self {
			Category::Checksum => "Checksums (Non-Cryptographic)",
			Category::FastHash => "Fast Cryptographic Hashes",
			Category::PasswordHash => "Password Hashing / KDFs",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.label())
	}
}

/// Password-hash constructions that need the whole message at once.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PasswordScheme {
	Bcrypt,
	Argon2id,
}

/// How a descriptor produces its digest. A descriptor is either streamed
/// through an accumulator or handed whole to a password-hash scheme,
/// never both.
#[derive(Clone, Copy)]
pub enum Construction {
	Streaming(AccumulatorFactory),
	Password(PasswordScheme),
}

impl fmt::Debug for Construction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Construction::Streaming(_) => write!(f, "Streaming"),
			Construction::Password(scheme) => {
				write!(f, "Password({:?})", scheme)
			}
		}
	}
}

#[derive(Clone, Debug)]
pub struct AlgorithmDescriptor {
	/// Lowercase identifier accepted by `-a/--algorithm`.
	pub identifier: &'static str,
	pub display_name: &'static str,
	pub description: &'static str,
	pub category: Category,
	/// Known collision attacks; the CLI prints a warning banner.
	pub weak: bool,
	pub construction: Construction,
}

impl AlgorithmDescriptor {
	pub fn is_password_hash(&self) -> bool {
		matches!(self.construction, Construction::Password(_))
	}

	/// Fresh accumulator for streaming algorithms, `None` for password
	/// hashes.
	pub fn accumulator(&self) -> Option<Box<dyn Accumulator>> {
		match self.construction {
			Construction::Streaming(factory) => Some(factory()),
			Construction::Password(_) => None,
		}
	}

	pub fn password_scheme(&self) -> Option<PasswordScheme> {
		match self.construction {
			Construction::Password(scheme) => Some(scheme),
			Construction::Streaming(_) => None,
		}
	}
}

macro_rules! streaming {
	($ty:ty) => {
		Construction::Streaming(|| -> Box<dyn Accumulator> {
			Box::new(<$ty>::default())
		})
	};
}

macro_rules! descriptor {
	($id:expr, $name:expr, $category:expr, $construction:expr, $desc:expr $(,)?) => {
		AlgorithmDescriptor {
			identifier: $id,
			display_name: $name,
			description: $desc,
			category: $category,
			weak: false,
			construction: $construction,
		}
	};
}

fn builtin_descriptors() -> Vec<AlgorithmDescriptor> {
	use Category::*;
	vec![
		descriptor!(
			"crc32",
			"CRC32",
			Checksum,
			streaming!(Crc32),
			"Fast checksum for detecting accidental data corruption; not suitable for security.",
		),
		AlgorithmDescriptor {
			weak: true,
			..descriptor!(
				"md5",
				"MD5",
				FastHash,
				streaming!(md5::Md5),
				"128-bit hash, widely used but cryptographically broken. Use only for legacy compatibility.",
			)
		},
		AlgorithmDescriptor {
			weak: true,
			..descriptor!(
				"sha1",
				"SHA-1",
				FastHash,
				streaming!(sha1::Sha1),
				"160-bit hash, deprecated for security use. Common in legacy systems and git.",
			)
		},
		descriptor!(
			"sha224",
			"SHA-224",
			FastHash,
			streaming!(sha2::Sha224),
			"Truncated variant of SHA-256 with 224-bit output.",
		),
		descriptor!(
			"sha256",
			"SHA-256",
			FastHash,
			streaming!(sha2::Sha256),
			"Cryptographic hash widely used for integrity checks and content addressing.",
		),
		descriptor!(
			"sha384",
			"SHA-384",
			FastHash,
			streaming!(sha2::Sha384),
			"Truncated variant of SHA-512 with 384-bit output.",
		),
		descriptor!(
			"sha512",
			"SHA-512",
			FastHash,
			streaming!(sha2::Sha512),
			"512-bit hash from the SHA-2 family, suitable for high-security applications.",
		),
		descriptor!(
			"sha512-224",
			"SHA-512/224",
			FastHash,
			streaming!(sha2::Sha512_224),
			"SHA-512 truncated to 224 bits, optimized for 64-bit platforms.",
		),
		descriptor!(
			"sha512-256",
			"SHA-512/256",
			FastHash,
			streaming!(sha2::Sha512_256),
			"SHA-512 truncated to 256 bits, optimized for 64-bit platforms.",
		),
		descriptor!(
			"sha3-224",
			"SHA3-224",
			FastHash,
			streaming!(sha3::Sha3_224),
			"224-bit SHA-3 hash based on Keccak sponge construction.",
		),
		descriptor!(
			"sha3-256",
			"SHA3-256",
			FastHash,
			streaming!(sha3::Sha3_256),
			"256-bit SHA-3 hash, NIST standard alternative to SHA-256.",
		),
		descriptor!(
			"sha3-384",
			"SHA3-384",
			FastHash,
			streaming!(sha3::Sha3_384),
			"384-bit SHA-3 hash based on Keccak sponge construction.",
		),
		descriptor!(
			"sha3-512",
			"SHA3-512",
			FastHash,
			streaming!(sha3::Sha3_512),
			"512-bit SHA-3 hash, highest security level in SHA-3 family.",
		),
		descriptor!(
			"ripemd160",
			"RIPEMD-160",
			FastHash,
			streaming!(ripemd::Ripemd160),
			"160-bit hash used in Bitcoin addresses and PGP fingerprints.",
		),
		descriptor!(
			"blake2b-256",
			"BLAKE2b-256",
			FastHash,
			streaming!(blake2::Blake2b<U32>),
			"Fast cryptographic hash, faster than MD5 while being secure.",
		),
		descriptor!(
			"blake2b-384",
			"BLAKE2b-384",
			FastHash,
			streaming!(blake2::Blake2b<U48>),
			"384-bit BLAKE2b variant, optimized for 64-bit platforms.",
		),
		descriptor!(
			"blake2b-512",
			"BLAKE2b-512",
			FastHash,
			streaming!(blake2::Blake2b512),
			"512-bit BLAKE2b, one of the fastest secure hash functions.",
		),
		descriptor!(
			"blake2s-256",
			"BLAKE2s-256",
			FastHash,
			streaming!(blake2::Blake2s256),
			"BLAKE2s optimized for 8-32 bit platforms and small inputs.",
		),
		descriptor!(
			"blake3",
			"BLAKE3",
			FastHash,
			streaming!(Blake3),
			"Tree-structured successor of BLAKE2 with SIMD-friendly 256-bit output.",
		),
		descriptor!(
			"sm3",
			"SM3",
			FastHash,
			streaming!(sm3::Sm3),
			"256-bit Chinese national standard hash (GB/T 32905-2016).",
		),
		descriptor!(
			"whirlpool",
			"Whirlpool",
			FastHash,
			streaming!(whirlpool::Whirlpool),
			"512-bit hash built on a modified AES block cipher, ISO/IEC 10118-3.",
		),
		descriptor!(
			"tiger",
			"Tiger",
			FastHash,
			streaming!(tiger::Tiger),
			"192-bit hash designed for 64-bit platforms, used in TTH file trees.",
		),
		descriptor!(
			"bcrypt",
			"bcrypt",
			PasswordHash,
			Construction::Password(PasswordScheme::Bcrypt),
			"Adaptive password hashing with configurable cost factor.",
		),
		descriptor!(
			"argon2id",
			"Argon2id",
			PasswordHash,
			Construction::Password(PasswordScheme::Argon2id),
			"Memory-hard password hashing algorithm designed to resist GPU and ASIC attacks.",
		),
	]
}

pub struct Catalog {
	by_identifier: HashMap<&'static str, AlgorithmDescriptor>,
	by_display_name: HashMap<&'static str, &'static str>,
}

impl Catalog {
	fn from_descriptors(descriptors: Vec<AlgorithmDescriptor>) -> Self {
		let by_display_name = descriptors
			.iter()
			.map(|d| (d.display_name, d.identifier))
			.collect();
		let by_identifier = descriptors
			.into_iter()
			.map(|d| (d.identifier, d))
			.collect();
		Self {
			by_identifier,
			by_display_name,
		}
	}

	/// Case-insensitive lookup by identifier.
	pub fn lookup(
		&self,
		identifier: &str,
	) -> Option<&AlgorithmDescriptor> {
		let needle = identifier.trim().to_ascii_lowercase();
		self.by_identifier.get(needle.as_str())
	}

	pub fn identifier_for_display_name(
		&self,
		display_name: &str,
	) -> Option<&'static str> {
		self.by_display_name.get(display_name).copied()
	}

	pub fn len(&self) -> usize {
		self.by_identifier.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_identifier.is_empty()
	}

	/// Descriptors grouped by category in display order, each group
	/// sorted by display name. Empty categories are omitted.
	pub fn grouped(
		&self,
	) -> Vec<(Category, Vec<&AlgorithmDescriptor>)> {
		Category::iter()
			.filter_map(|category| {
				let mut members: Vec<_> = self
					.by_identifier
					.values()
					.filter(|d| d.category == category)
					.collect();
				if members.is_empty() {
					return None;
				}
				members.sort_by(|a, b| {
					a.display_name.cmp(b.display_name)
				});
				Some((category, members))
			})
			.collect()
	}

	pub fn sorted(&self) -> Vec<&AlgorithmDescriptor> {
		self.grouped()
			.into_iter()
			.flat_map(|(_, members)| members)
			.collect()
	}

	pub fn identifiers(&self) -> Vec<&'static str> {
		let mut ids: Vec<_> =
			self.by_identifier.keys().copied().collect();
		ids.sort_unstable();
		ids
	}
}

static CATALOG: Lazy<Arc<Catalog>> = Lazy::new(|| {
	Arc::new(Catalog::from_descriptors(builtin_descriptors()))
});

/// Shared handle to the built-in catalog.
pub fn shared() -> Arc<Catalog> {
	Arc::clone(&CATALOG)
}

/// Look up a built-in algorithm by identifier.
pub fn lookup(identifier: &str) -> Option<&'static AlgorithmDescriptor> {
	let catalog: &'static Catalog = &CATALOG;
	catalog.lookup(identifier)
}
