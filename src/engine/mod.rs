// Engine modules: scene graph, animation, assets, input, timing

pub mod animation;
pub mod assets;
pub mod game_loop;
pub mod input;
pub mod scene;
