use bencher::{benchmark_group, benchmark_main, Bencher};

use extents::{Array, Bitset, ByteString};

fn array_append(bencher: &mut Bencher) {
    bencher.bytes = 8 * 1024;
    bencher.iter(|| {
        let mut array = Array::<u64>::new();
        for i in 0 .. 1024u64 {
            array.append(i).unwrap();
        }
        bencher::black_box(array);
    });
}

fn vec_push(bencher: &mut Bencher) {
    bencher.bytes = 8 * 1024;
    bencher.iter(|| {
        let mut vec = Vec::<u64>::new();
        for i in 0 .. 1024u64 {
            vec.push(i);
        }
        bencher::black_box(vec);
    });
}

fn array_inject_front(bencher: &mut Bencher) {
    bencher.iter(|| {
        let mut array = Array::<u32>::new();
        for i in 0 .. 256u32 {
            array.insert(0, i).unwrap();
        }
        bencher::black_box(array);
    });
}

fn string_catf(bencher: &mut Bencher) {
    bencher.iter(|| {
        let mut string = ByteString::new();
        for i in 0 .. 256 {
            string.catf(format_args!("{} ", i)).unwrap();
        }
        bencher::black_box(string);
    });
}

fn bitset_popcnt(bencher: &mut Bencher) {
    let mut bitset = Bitset::new(1 << 16).unwrap();
    for i in (0 .. 1 << 16).step_by(3) {
        bitset.set(i);
    }
    bencher.bytes = 1 << 13;
    bencher.iter(|| bencher::black_box(bitset.popcnt()));
}

fn bitset_ones(bencher: &mut Bencher) {
    let mut bitset = Bitset::new(1 << 16).unwrap();
    for i in (0 .. 1 << 16).step_by(97) {
        bitset.set(i);
    }
    bencher.iter(|| bencher::black_box(bitset.ones().sum::<usize>()));
}

benchmark_group!(
    append,
    array_append,
    vec_push,
    array_inject_front,
    string_catf,
    bitset_popcnt,
    bitset_ones
);
benchmark_main!(append);
