pub mod broadphase;
