fn main() {
    println!("cargo:rerun-if-changed=templates");

    // Release binaries carry the search page templates; debug builds read them from disk.
    if std::env::var("PROFILE").as_deref() == Ok("release") {
        minijinja_embed::embed_templates!("templates");
    } else {
        println!("cargo:info=Templates are loaded from disk in debug builds.");
    }
}
