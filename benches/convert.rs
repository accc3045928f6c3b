use criterion::{black_box, criterion_group, criterion_main, Criterion};

use crabgraph::config::DEFAULT_REFERENCE_ELEMENTS;
use crabgraph::features::{distance_matrix, local_density, nearest_neighbor_features};
use crabgraph::sdf::{parse_molfile, records_from_str, write_molfile};
use crabgraph::{from_smiles, remove_hs, FileFormat, MolGraph, MoleculeToGraph, Similarity};

const CAFFEINE: &str = "Cn1cnc2c1c(=O)n(C)c(=O)n2C";
const ATORVASTATIN: &str =
    "CC(C)c1c(C(=O)Nc2ccccc2)c(-c2ccccc2)c(-c2ccc(F)cc2)n1CC[C@@H](O)C[C@@H](O)CC(=O)O";

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("smiles/caffeine", |b| {
        b.iter(|| black_box(from_smiles(black_box(CAFFEINE)).unwrap()))
    });
    group.bench_function("smiles/atorvastatin", |b| {
        b.iter(|| black_box(from_smiles(black_box(ATORVASTATIN)).unwrap()))
    });

    let graph = MolGraph::from_mol(&remove_hs(&from_smiles(ATORVASTATIN).unwrap()));
    let molfile = write_molfile(&graph).unwrap();
    group.bench_function("molfile/atorvastatin", |b| {
        b.iter(|| black_box(parse_molfile(black_box(&molfile)).unwrap()))
    });

    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let lines: String = (0..100)
        .map(|i| if i % 2 == 0 { CAFFEINE } else { ATORVASTATIN })
        .collect::<Vec<_>>()
        .join("\n");
    let converter = MoleculeToGraph::new(FileFormat::Smi);

    c.bench_function("convert/smiles_to_graph_x100", |b| {
        b.iter(|| {
            converter
                .graphs(records_from_str(black_box(&lines), FileFormat::Smi))
                .count()
        })
    });

    let graph = MolGraph::from_mol(&from_smiles(ATORVASTATIN).unwrap());
    c.bench_function("convert/graph_to_molfile", |b| {
        b.iter(|| black_box(write_molfile(black_box(&graph)).unwrap()))
    });
}

fn bench_features(c: &mut Criterion) {
    let mol = from_smiles(ATORVASTATIN).unwrap();
    let atomic_nums: Vec<u8> = mol.atoms().map(|idx| mol.atom(idx).atomic_num).collect();
    // a helix stands in for real coordinates
    let coords: Vec<[f64; 3]> = (0..atomic_nums.len())
        .map(|i| {
            let t = i as f64 * 0.6;
            [t.cos() * 3.0, t.sin() * 3.0, t * 0.5]
        })
        .collect();

    let mut group = c.benchmark_group("features");

    group.bench_function("distance_matrix", |b| {
        b.iter(|| black_box(distance_matrix(black_box(&coords))))
    });

    let distances = distance_matrix(&coords);
    group.bench_function("metric", |b| {
        b.iter(|| {
            for row in &distances {
                black_box(nearest_neighbor_features(
                    row,
                    &atomic_nums,
                    &DEFAULT_REFERENCE_ELEMENTS,
                    3,
                    0.0,
                    &Similarity::Inverse,
                ));
            }
        })
    });
    group.bench_function("topological", |b| {
        b.iter(|| {
            for row in &distances {
                black_box(local_density(row));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_convert, bench_features);
criterion_main!(benches);
