use clap::Parser;

use dungeon_generator::ascii;
use dungeon_generator::collision::CollisionMask;
use dungeon_generator::generator::Generator;
use dungeon_generator::room::FloorKind;
use dungeon_generator::world::World;

#[derive(Parser, Debug)]
#[command(name = "dungeon_generator")]
#[command(about = "Generate procedural dungeon floors and print them as ASCII")]
struct Args {
    /// Random seed (uses a random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Dungeon floor type: f (fire), l (lush) or w (water)
    #[arg(short, long, default_value = "f")]
    floor: char,

    /// Generate the lobby instead of a dungeon floor
    #[arg(long)]
    lobby: bool,

    /// Collision reference image; pixels that are not opaque white are solid
    #[arg(long)]
    mask: Option<String>,
}

fn main() {
    let args = Args::parse();

    let Some(floor) = FloorKind::from_char(args.floor) else {
        eprintln!("unknown floor type '{}', expected f, l or w", args.floor);
        std::process::exit(1);
    };

    let collision = match &args.mask {
        Some(path) => match CollisionMask::load(path) {
            Ok(mask) => mask,
            Err(error) => {
                eprintln!("failed to load collision mask {}: {}", path, error);
                std::process::exit(1);
            }
        },
        None => CollisionMask::empty(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut world = World::new(collision);
    let mut generator = Generator::new(seed);
    if args.lobby {
        generator.generate_lobby(&mut world);
    } else {
        generator.generate_dungeon(&mut world, floor);
    }

    println!();
    print!("{}", ascii::render_world(&world));
    println!();
    print!("{}", ascii::room_summary(&world));
}
