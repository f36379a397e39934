use std::hint::black_box;

use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};
use twig_syntax::{
    CacheConfig, GreenElement, GreenNode, GreenToken, ListBuilder, Retention, SeparatedSyntaxList,
    SyntaxKind, SyntaxNode,
};

const NUMBER: SyntaxKind = SyntaxKind(1);
const COMMA: SyntaxKind = SyntaxKind(2);
const LITERAL: SyntaxKind = SyntaxKind(3);
const ARGS: SyntaxKind = SyntaxKind(4);

fn separated_list(len: usize) -> GreenNode {
    let mut builder = ListBuilder::with_capacity(len * 2);
    for i in 0..len {
        if i > 0 {
            builder.append_separator(GreenToken::new(COMMA, ", "));
        }
        let number = GreenToken::new(NUMBER, &i.to_string());
        builder.append(GreenNode::new(LITERAL, [Some(number.into())]));
    }
    let list = builder.freeze_separated().unwrap().unwrap();
    GreenNode::new(ARGS, [Some(list.into())])
}

/// Wide non-list node; offsets go through cached neighbors rather than a
/// prefix table.
fn wide_node(len: usize) -> GreenNode {
    GreenNode::new(
        ARGS,
        (0..len).map(|i| {
            let number = GreenToken::new(NUMBER, &i.to_string());
            Some(GreenElement::from(GreenNode::new(LITERAL, [Some(number.into())])))
        }),
    )
}

fn benchmark_positions(c: &mut Criterion) {
    let retentions = [("strong", Retention::Strong), ("weak", Retention::Weak)];

    let mut group = c.benchmark_group("Separated List Elements");
    for len in [16, 1024, 16_384] {
        let green = separated_list(len);
        group.throughput(Throughput::Elements(len as u64));
        for (name, retention) in retentions {
            let config = CacheConfig::new().with_retention(retention);
            group.bench_with_input(BenchmarkId::new(name, len), &green, |b, green| {
                b.iter(|| {
                    let root = SyntaxNode::new_root_with_config(green.clone(), config);
                    let list = SeparatedSyntaxList::from_slot(&root, 0);
                    for element in list.iter() {
                        black_box(element.offset());
                    }
                });
            });
        }
    }
    group.finish();

    let mut group = c.benchmark_group("Wide Node Random Access");
    for len in [64, 1024] {
        let green = wide_node(len);
        group.throughput(Throughput::Elements(len as u64));
        for (name, retention) in retentions {
            let config = CacheConfig::new().with_retention(retention);
            group.bench_with_input(BenchmarkId::new(name, len), &green, |b, green| {
                b.iter(|| {
                    let root = SyntaxNode::new_root_with_config(green.clone(), config);
                    let mut held = Vec::with_capacity(len);
                    for index in (0..len).rev() {
                        held.push(root.node_slot(index));
                    }
                    black_box(held);
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_positions);
criterion_main!(benches);
