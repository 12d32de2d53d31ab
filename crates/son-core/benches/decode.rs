use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use son_core::{from_xml, to_json_string, Document};

/// A result envelope holding `rows` documents, each with a mix of value kinds.
fn sample_xml(rows: usize) -> String {
    let mut xml = String::from("<result><meta count=\"1\"/><doc><array name=\"rows\">");
    for i in 0..rows {
        xml.push_str(&format!(
            "<doc name=\"{i}\">\
               <oid name=\"_id\">{i:024x}</oid>\
               <string name=\"name\">user-{i}</string>\
               <int name=\"age\">{age}</int>\
               <boolean name=\"active\">true</boolean>\
               <date name=\"seen\">1234567890123</date>\
               <regex name=\"re\"><pattern name=\"p\">^u</pattern><options name=\"o\">i</options></regex>\
             </doc>",
            age = 20 + i % 50
        ));
    }
    xml.push_str("</array></doc></result>");
    xml
}

fn bench_decode(c: &mut Criterion) {
    let xml = sample_xml(500);
    c.bench_function("from_xml 500 rows", |b| {
        b.iter(|| from_xml(black_box(&xml)).unwrap())
    });

    let doc: Document = from_xml(&xml).unwrap();
    c.bench_function("to_json_string 500 rows", |b| {
        b.iter(|| to_json_string(black_box(&doc)).unwrap())
    });
    c.bench_function("to_dict 500 rows", |b| b.iter(|| black_box(&doc).to_dict()));
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
