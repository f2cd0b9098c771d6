use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use fotofx_filters::FilterRegistry;
use fotofx_image::Image;

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("Registry");
    let registry = FilterRegistry::new();

    for (width, height) in [(256, 224), (512, 448)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let parameter_string = format!("{}x{}", width, height);

        let image_size = [*width, *height].into();
        let image_data = (0..width * height * 3).map(|i| (i * 7 % 256) as u8).collect();
        let image = Image::<u8, 3>::new(image_size, image_data).unwrap();

        for kind in registry.iter() {
            let params: Vec<f32> = kind
                .param_spec()
                .map(|spec| vec![spec.min])
                .unwrap_or_default();

            group.bench_with_input(
                BenchmarkId::new(kind.name().replace(' ', "_"), &parameter_string),
                &image,
                |b, i| b.iter(|| black_box(registry.apply(kind.name(), i, &params))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_registry);
criterion_main!(benches);
