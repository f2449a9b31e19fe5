use crate::{args::Args, env_vars};
use cocgate_core::GatewayConfig;
use std::env;

/// Print startup banner with configuration
pub fn print_startup_info(args: &Args, config: &GatewayConfig) {
    if args.quiet {
        // Quiet mode: only essential information
        println!(
            "🚀 cocgate v{} starting on port {}",
            env!("CARGO_PKG_VERSION"),
            args.listen
        );
        return;
    }

    // Normal/verbose mode: full configuration display
    println!("🛡️  {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("   {}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("📡 Network Configuration:");
    println!("   Listen:         {}:{}", args.bind, args.listen);
    println!("   Path Prefix:    {}", config.prefix);
    println!();
    println!("🔧 Upstream Endpoints:");
    println!("   Developer API:  {}", config.portal_url);
    println!("   Resource API:   {}", config.api_url);
    println!("   IP Echo:        {}", config.ip_echo_url);

    print_security_config(config);

    // Show environment configuration in verbose mode
    if args.verbose {
        print_env_config();
    }

    println!();
    println!("🚀 Server starting...");
}

/// Print security configuration summary
fn print_security_config(config: &GatewayConfig) {
    println!();
    println!("🔒 Security:");
    if config.secret.is_some() {
        println!("   Shared Secret:  configured");
    } else {
        println!("   Shared Secret:  ⚠️  NOT SET - all proxied requests will be rejected");
    }
    if config.credentials().is_some() {
        println!("   Portal Login:   configured");
    } else {
        println!("   Portal Login:   ⚠️  NOT SET - provisioning will fail with 400");
    }
}

/// Print current environment variable values (verbose mode)
fn print_env_config() {
    println!();
    println!("🌍 Environment Variables:");
    for var in env_vars::all_env_vars() {
        let display = match env::var(var) {
            // Never echo secrets into logs
            Ok(_)
                if *var == env_vars::SECRET || *var == env_vars::DEV_PASSWORD =>
            {
                "<set>".to_string()
            }
            Ok(value) => value,
            Err(_) => "<unset>".to_string(),
        };
        println!("   {var}: {display}");
    }
}
