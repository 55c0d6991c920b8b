//! Creature profile rolls: habitat, climate, diet, size and typing.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! catalog {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

catalog!(Habitat {
    Coast, Desert, Field, Forest, Hills, Mountain, River,
});

catalog!(Climate {
    Continental, Dry, Polar, Temperate, Tropical,
});

catalog!(Diet {
    Carnivore, Herbivore, Omnivore,
});

catalog!(Size {
    Tiny, Small, Medium, Large, Huge,
});

catalog!(
    /// Elemental typing.
    Type {
        Bug, Dark, Dragon, Electric, Fairy, Fighting, Fire, Flying, Ghost, Grass, Ground, Ice,
        Normal, Poison, Psychic, Rock, Steel, Water,
    }
);

/// Descriptive attributes rolled alongside a stat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureProfile {
    pub habitat: Habitat,
    pub climate: Climate,
    pub diet: Diet,
    pub size: Size,
    pub primary_type: Type,
    /// `None` for single-typed creatures.
    pub secondary_type: Option<Type>,
}

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, options: &[T]) -> T {
    *options
        .choose(rng)
        .unwrap_or_else(|| unreachable!("catalogs are never empty"))
}

/// Roll every attribute uniformly; a repeated type roll yields a single type.
pub fn roll_profile<R: Rng + ?Sized>(rng: &mut R) -> CreatureProfile {
    let habitat = pick(rng, Habitat::ALL);
    let climate = pick(rng, Climate::ALL);
    let diet = pick(rng, Diet::ALL);
    let size = pick(rng, Size::ALL);
    let primary_type = pick(rng, Type::ALL);
    let second = pick(rng, Type::ALL);
    CreatureProfile {
        habitat,
        climate,
        diet,
        size,
        primary_type,
        secondary_type: (second != primary_type).then_some(second),
    }
}
