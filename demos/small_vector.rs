use small_vector::SmallVector;

fn main() {
    let mut v = SmallVector::<i32, 4>::new();

    for i in 1..=4 {
        v.push(i);
    }
    println!("Vector: {:?} (inline: {})", v, v.is_inline());

    v.push(5);
    println!("Vector: {:?} (inline: {}, capacity: {})", v, v.is_inline(), v.capacity());
    println!("Sum: {}", v.iter().sum::<i32>());

    v.retain(|x| *x % 2 == 0);
    v.shrink_to_inline();
    println!("Even numbers: {:?} (inline: {})", v, v.is_inline());
}
