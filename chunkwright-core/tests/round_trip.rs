use chunkwright_core::bitpack::{self, PackLayout};
use chunkwright_core::palette;
use chunkwright_core::payload::{self, Compression};
use chunkwright_core::{Block, Chunk, ChunkFormat, Family, Platform, VersionRegistry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn stone_and_ores(seed: u64) -> Chunk {
    let mut rng = StdRng::seed_from_u64(seed);
    let blocks = [
        Block::from_full_name("minecraft:stone").unwrap(),
        Block::from_full_name("minecraft:iron_ore").unwrap(),
        Block::from_full_name("minecraft:coal_ore").unwrap(),
        "minecraft:oak_log[axis=y]".parse::<Block>().unwrap(),
    ];
    let mut chunk = Chunk::new(-3, 12);
    for _ in 0..2000 {
        let block = blocks[rng.random_range(0..blocks.len())].clone();
        chunk.set_block(
            rng.random_range(0..16),
            rng.random_range(-64..80),
            rng.random_range(0..16),
            block,
        )
        .unwrap();
    }
    chunk
}

#[test]
fn test_bitpack_random_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let count = rng.random_range(0..=4096);
        let bits = rng.random_range(1..=32usize);
        let max = if bits == 32 { u32::MAX } else { (1u32 << bits) - 1 };
        let values: Vec<u32> = (0..count).map(|_| rng.random_range(0..=max)).collect();

        for layout in [PackLayout::Dense, PackLayout::Sparse] {
            let packed = bitpack::encode(&values, bits, layout).unwrap();
            assert_eq!(packed.bits_per_entry, bits);
            assert_eq!(packed.words.len(), bitpack::words_required(count, bits, layout));
            let decoded = bitpack::decode(&packed.words, count, bits, layout).unwrap();
            assert_eq!(decoded, values);
        }
    }
}

#[test]
fn test_palette_merge_properties() {
    let names = ["stone", "dirt", "air", "granite", "andesite", "sand"];
    let mut rng = StdRng::seed_from_u64(7);
    let sections: Vec<Vec<Block>> = (0..8)
        .map(|_| {
            let mut local: Vec<Block> = names
                .iter()
                .filter(|_| rng.random_bool(0.5))
                .map(|n| Block::new("minecraft", *n).unwrap())
                .collect();
            local.dedup();
            local
        })
        .collect();

    let air = Block::air();
    let merged = palette::merge(std::slice::from_ref(&air), &sections);
    let mut distinct: Vec<&Block> = sections.iter().flatten().chain([&air]).collect();
    distinct.sort();
    distinct.dedup();
    assert_eq!(merged.palette.len(), distinct.len());

    for (section, remap) in sections.iter().zip(&merged.remaps) {
        assert_eq!(section.len(), remap.len());
        for (local, &global) in remap.iter().enumerate() {
            assert_eq!(merged.palette.get(global), Some(&section[local]));
        }
    }
}

#[test]
fn test_chunk_survives_every_java_era() {
    let format = ChunkFormat::java();
    let original = stone_and_ores(42);

    for version in [1519, 1976, 2586, 2730, 3465, 4671] {
        let saved = format.save(&original, version).unwrap();
        let framed = payload::wrap(&saved.bytes, Compression::Zlib).unwrap();
        let (bytes, _) = payload::unwrap(&framed).unwrap();
        let loaded = format.load(&bytes).unwrap();

        assert_eq!(loaded.data_version, version);
        assert_eq!((loaded.chunk.cx, loaded.chunk.cz), (-3, 12));
        for y in -64..80 {
            for x in 0..16 {
                for z in 0..16 {
                    let want = original.block_at(x, y, z).filter(|b| !b.is_air());
                    let got = loaded.chunk.block_at(x, y, z).filter(|b| !b.is_air());
                    assert_eq!(got, want, "{version} at {x},{y},{z}");
                }
            }
        }
    }
}

#[test]
fn test_downgrade_drops_entities() {
    let registry = VersionRegistry::builtin();
    let format = ChunkFormat::new(std::sync::Arc::new(registry), Platform::Java);
    let mut chunk = Chunk::new(0, 0);
    chunk.misc.insert(Family::Entities, Some(fastnbt::Value::List(vec![])));

    let kept = format.save(&chunk, 2586).unwrap();
    assert!(kept.dropped.is_empty());
    let lost = format.save(&chunk, 2730).unwrap();
    assert_eq!(lost.dropped, vec![Family::Entities]);
}
