mod common;

use pretty_assertions::assert_eq;

#[test]
fn minimal_sam_record() {
    let bed = common::convert(
        &["--input", "sam"],
        b"r1\t0\tchr1\t100\t30\t10M\t*\t0\t0\tACGTACGTAC\t**********\n",
    );
    assert_eq!(
        String::from_utf8(bed).unwrap(),
        "chr1\t99\t109\tr1\t0\t+\t30\t10M\t*\t0\t0\tACGTACGTAC\t**********\n"
    );
}

#[test]
fn unmapped_sam_read_with_all_reads() {
    let bed = common::convert(
        &["--input", "sam", "--all-reads"],
        b"r1\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t****\n",
    );
    assert!(bed.starts_with(b"_unmapped\t0\t1\t"));
}

#[test]
fn sam_header_preserved_in_order() {
    let input = b"@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:1000\nr1\t0\tchr1\t100\t30\t4M\t*\t0\t0\tACGT\t****\n";
    let bed = common::convert(&["--input", "sam", "--keep-header"], input);
    let text = String::from_utf8(bed).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "_header\t0\t1\t@HD\tVN:1.6");
    assert_eq!(lines[1], "_header\t1\t2\t@SQ\tSN:chr1\tLN:1000");
    assert!(lines[2].starts_with("chr1\t99\t104\t"));
}

#[test]
fn gff_zero_length_insertion() {
    let bed = common::convert(
        &["--input", "gff"],
        b"chr1\t.\tinsertion\t200\t199\t.\t+\t.\tID=ins1\n",
    );
    let text = String::from_utf8(bed).unwrap();
    let cols: Vec<&str> = text.trim_end().split('\t').collect();
    assert_eq!((cols[1], cols[2]), ("198", "200"));
    assert!(cols.last().unwrap().ends_with(";zero_length_insertion=True"));
}

#[test]
fn vcf_multi_allele_split() {
    let bed = common::convert(
        &["--input", "vcf"],
        b"chr1\t1000\trs1\tA\tC,G\t.\tPASS\t.\n",
    );
    let text = String::from_utf8(bed).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("chr1\t999\t1000\t"));
    assert!(lines[1].starts_with("chr1\t999\t1000\t"));
    assert_eq!(lines[0].split('\t').nth(7), Some("C"));
    assert_eq!(lines[1].split('\t').nth(7), Some("G"));
}

#[test]
fn wig_fixed_step_expansion() {
    let bed = common::convert(
        &["--input", "wig"],
        b"fixedStep chrom=chrX start=10 step=2 span=5\n0.1\n0.2\n0.3\n",
    );
    assert_eq!(
        String::from_utf8(bed).unwrap(),
        "chrX\t9\t14\tid.1\t0.1\nchrX\t11\t16\tid.2\t0.2\nchrX\t13\t18\tid.3\t0.3\n"
    );
}

#[test]
fn wig_multisplit_prefixes_section_ids() {
    let bed = common::convert(
        &["--input", "wig", "--multisplit", "cov"],
        b"variableStep chrom=chr1\n5 1.0\nvariableStep chrom=chr1\n9 2.0\n",
    );
    assert_eq!(
        String::from_utf8(bed).unwrap(),
        "chr1\t4\t5\tcov.1.1\t1.0\nchr1\t8\t9\tcov.2.1\t2.0\n"
    );
}

#[test]
fn gtf_uses_gene_id_attribute() {
    let bed = common::convert(
        &["--input", "gtf"],
        b"chr1\tensembl\texon\t50\t100\t.\t+\t.\tgene_id \"g42\"; transcript_id \"t7\";\n",
    );
    let text = String::from_utf8(bed).unwrap();
    assert_eq!(text.split('\t').nth(3), Some("g42"));
}

#[test]
fn psl_split_emits_block_elements() {
    let record = b"50\t1\t0\t0\t0\t0\t1\t10\t+\tq1\t60\t0\t51\tchr7\t1000\t100\t161\t2\t25,26,\t0,25,\t100,135,\n";
    let bed = common::convert(&["--input", "psl", "--split"], record);
    let text = String::from_utf8(bed).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("chr7\t100\t125\tq1\t"));
    assert!(lines[1].starts_with("chr7\t135\t161\tq1\t"));
}

#[test]
fn sam_columns_round_trip() {
    let record = "r9\t16\tchr3\t42\t60\t8M\t=\t100\t-58\tACGTACGT\tFFFFFFFF\tNM:i:1";
    let bed = common::convert(&["--input", "sam"], format!("{record}\n").as_bytes());
    let text = String::from_utf8(bed).unwrap();
    let cols: Vec<&str> = text.trim_end().split('\t').collect();

    // Reverse the column map: (chrom, start, stop, qname, flag, strand, rest..)
    // must rebuild the original record, optional tag fields included.
    let pos = (cols[1].parse::<u64>().unwrap() + 1).to_string();
    let mut rebuilt = vec![cols[3], cols[4], cols[0], pos.as_str()];
    rebuilt.extend_from_slice(&cols[6..]);
    assert_eq!(rebuilt.join("\t"), record);
}

#[test]
fn output_order_matches_input_order_without_sort() {
    let input = b"chr9\t.\tgene\t500\t600\t.\t+\t.\tID=g1\nchr2\t.\tgene\t100\t200\t.\t+\t.\tID=g2\nchr2\t.\tgene\t50\t60\t.\t+\t.\tID=g3\n";
    let bed = common::convert(&["--input", "gff"], input);
    let text = String::from_utf8(bed).unwrap();
    let ids: Vec<&str> = text
        .lines()
        .map(|line| line.split('\t').nth(3).unwrap())
        .collect();
    assert_eq!(ids, ["g1", "g2", "g3"]);
}

#[test]
fn deepest_chain_shape_runs_dry_on_empty_input() {
    // Stand-in children for the BAM -> starch chain: three children, three
    // worker threads, all joining cleanly on empty input.
    let output = common::convert_through_chain(&["--input", "sam", "--output", "starch"], Vec::new());
    assert!(output.is_empty());
}

#[test]
fn deepest_chain_shape_translates_records() {
    let input = b"@HD\tVN:1.6\nr1\t0\tchr1\t100\t30\t10M\t*\t0\t0\tACGTACGTAC\t**********\n".to_vec();
    let output = common::convert_through_chain(&["--input", "sam"], input);
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "chr1\t99\t109\tr1\t0\t+\t30\t10M\t*\t0\t0\tACGTACGTAC\t**********\n"
    );
}
