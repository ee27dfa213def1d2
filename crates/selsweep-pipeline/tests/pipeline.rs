//! End-to-end scan tests over on-disk fixtures.

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use selsweep_pipeline::{run_pipeline, PipelineConfig};
use tempfile::TempDir;

const HITS_HEADER: &str =
    "chromosome\tmarker_id\taux\tposition\tfreq1\tfreq2\traw_score\tabs_score";

/// JM: eleven zero scores on chromosome 1 plus one strong outlier on 2
/// (mean 1, sd sqrt(12), cutoff about 11.39, so exactly one hit).
/// RW: a single marker, too few observations for a threshold.
fn write_scan_fixtures(input_dir: &Path) {
    let mut chr1 = String::new();
    for i in 1..=11 {
        chr1.push_str(&format!("snp{}\t.\t{}\t0.5\t0.5\t0.0\t0.0\n", i, i * 1000));
    }
    fs::write(input_dir.join("JM_chr1_scores.norm"), chr1).unwrap();
    fs::write(
        input_dir.join("JM_chr2_scores.norm"),
        "snp_out\t.\t50000\t0.9\t0.1\t-12.0\t12.0\n",
    )
    .unwrap();

    fs::write(
        input_dir.join("RW_chr1_scores.norm"),
        "lonely\t.\t100\t0.5\t0.5\t1.0\t1.0\n",
    )
    .unwrap();
}

/// One gene inside the outlier's window, one at the same coordinates on the
/// wrong chromosome, one past the window's end.
fn write_catalogue(path: &Path) {
    fs::write(
        path,
        "##gff-version 3\n\
         2\tRefSeq\tgene\t60000\t70000\t.\t+\t.\tID=gene1;Name=KIT;Dbxref=GeneID:100,Ensembl:E1\n\
         1\tRefSeq\tgene\t60000\t70000\t.\t-\t.\tID=gene2;Name=OTHERCHROM\n\
         2\tRefSeq\tgene\t80000\t90000\t.\t+\t.\tID=gene3;Name=PASTWINDOW\n",
    )
    .unwrap();
}

fn config(
    input_dir: &Path,
    output_dir: &Path,
    populations: &[&str],
    annotation: Option<&Path>,
) -> PipelineConfig {
    PipelineConfig {
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        populations: populations.iter().map(|p| p.to_string()).collect(),
        max_chromosome: 3,
        k: 3.0,
        half_width: 25_000,
        annotation: annotation.map(|p| p.to_path_buf()),
    }
}

#[test]
fn test_scan_and_annotate_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();
    write_scan_fixtures(&input);
    let gff = dir.path().join("genes.gff");
    write_catalogue(&gff);
    let out = dir.path().join("out");

    let summary = run_pipeline(&config(&input, &out, &["JM"], Some(&gff))).unwrap();
    let report = summary.succeeded().next().unwrap();

    assert_eq!(report.population, "JM");
    assert_eq!(report.n_markers, 12);
    assert_relative_eq!(report.threshold.mean, 1.0);
    assert_relative_eq!(report.threshold.std_dev, 12f64.sqrt());
    assert_eq!(report.n_significant, 1);
    assert_eq!(report.n_annotation_hits, Some(1));
    assert_eq!(report.n_distinct_features, Some(1));
    assert!(report
        .warnings
        .iter()
        .any(|w| w.message.contains("no partition file for chromosome 3")));

    let merged = fs::read_to_string(&report.merged_path).unwrap();
    let lines: Vec<&str> = merged.lines().collect();
    assert_eq!(lines.len(), 12);
    assert_eq!(lines[0], "1\tsnp1\t.\t1000\t0.5\t0.5\t0\t0");
    assert_eq!(lines[11], "2\tsnp_out\t.\t50000\t0.9\t0.1\t-12\t12");

    let hits = fs::read_to_string(&report.hits_path).unwrap();
    assert_eq!(
        hits,
        format!("{}\n2\tsnp_out\t.\t50000\t0.9\t0.1\t-12\t12\n", HITS_HEADER)
    );

    let regions = fs::read_to_string(&report.regions_path).unwrap();
    assert_eq!(regions, "CHR\tSTART\tEND\n2\t25000\t75000\n");

    let annotation =
        fs::read_to_string(report.annotation_path.as_ref().unwrap()).unwrap();
    let mut lines = annotation.lines();
    assert!(lines.next().unwrap().starts_with("chr\tstart\tend\tfeature_type"));
    assert_eq!(
        lines.next().unwrap(),
        "2\t60000\t70000\tgene\tKIT\tGeneID:100\tRefSeq\t+\t.\t.\t\
         ID=gene1;Name=KIT;Dbxref=GeneID:100,Ensembl:E1"
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn test_population_failures_are_isolated() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();
    write_scan_fixtures(&input);
    let out = dir.path().join("out");

    let summary = run_pipeline(&config(&input, &out, &["JM", "RW"], None)).unwrap();

    let ok: Vec<&str> = summary.succeeded().map(|r| r.population.as_str()).collect();
    assert_eq!(ok, vec!["JM"]);

    let failed: Vec<(&str, String)> = summary
        .failed()
        .map(|(population, err)| (population, format!("{:#}", err)))
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, "RW");
    assert!(failed[0].1.contains("insufficient data"));

    // JM's outputs are complete; RW stopped after the merge step
    assert!(out.join("merged/JM_merged_scores.tsv").exists());
    assert!(out.join("significant_hits/JM_significant_hits.tsv").exists());
    assert!(out.join("regions/JM_regions.tsv").exists());
    assert!(out.join("merged/RW_merged_scores.tsv").exists());
    assert!(!out.join("significant_hits/RW_significant_hits.tsv").exists());
    assert!(!out.join("regions/RW_regions.tsv").exists());

    // no catalogue, no annotation directory
    assert!(!out.join("annotation").exists());
}

#[test]
fn test_zero_hits_reported_cleanly() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();
    fs::write(
        input.join("AN_chr1_scores.norm"),
        "a\t.\t100\t0.5\t0.5\t1.0\t1.0\n\
         b\t.\t200\t0.5\t0.5\t1.0\t1.0\n\
         c\t.\t300\t0.5\t0.5\t1.0\t1.0\n\
         d\t.\t400\t0.5\t0.5\t10.0\t10.0\n",
    )
    .unwrap();
    let gff = dir.path().join("genes.gff");
    write_catalogue(&gff);
    let out = dir.path().join("out");

    let summary = run_pipeline(&config(&input, &out, &["AN"], Some(&gff))).unwrap();
    let report = summary.succeeded().next().unwrap();

    // the lone high score still sits below mean + 3 sd
    assert_relative_eq!(report.threshold.mean, 3.25);
    assert_relative_eq!(report.threshold.std_dev, 4.5);
    assert_relative_eq!(report.threshold.threshold, 16.75);
    assert_eq!(report.n_significant, 0);
    assert_eq!(report.n_annotation_hits, Some(0));

    let hits = fs::read_to_string(&report.hits_path).unwrap();
    assert_eq!(hits, format!("{}\n", HITS_HEADER));
    let regions = fs::read_to_string(&report.regions_path).unwrap();
    assert_eq!(regions, "CHR\tSTART\tEND\n");
}

#[test]
fn test_unreadable_catalogue_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();
    write_scan_fixtures(&input);
    let out = dir.path().join("out");

    let missing = dir.path().join("no_such_catalogue.gff");
    let err = run_pipeline(&config(&input, &out, &["JM"], Some(&missing))).unwrap_err();
    assert!(format!("{:#}", err).contains("no_such_catalogue.gff"));
}

fn collect_tree(root: &Path, base: &Path, files: &mut Vec<(String, Vec<u8>)>) {
    let mut entries: Vec<_> = fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    entries.sort();
    for path in entries {
        if path.is_dir() {
            collect_tree(&path, base, files);
        } else {
            let name = path
                .strip_prefix(base)
                .unwrap()
                .to_string_lossy()
                .into_owned();
            files.push((name, fs::read(&path).unwrap()));
        }
    }
}

#[test]
fn test_runs_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input");
    fs::create_dir(&input).unwrap();
    write_scan_fixtures(&input);
    let gff = dir.path().join("genes.gff");
    write_catalogue(&gff);

    let out_a = dir.path().join("out_a");
    let out_b = dir.path().join("out_b");
    run_pipeline(&config(&input, &out_a, &["JM", "RW"], Some(&gff))).unwrap();
    run_pipeline(&config(&input, &out_b, &["JM", "RW"], Some(&gff))).unwrap();

    let mut tree_a = Vec::new();
    let mut tree_b = Vec::new();
    collect_tree(&out_a, &out_a, &mut tree_a);
    collect_tree(&out_b, &out_b, &mut tree_b);

    assert!(!tree_a.is_empty());
    assert_eq!(tree_a, tree_b);
}
